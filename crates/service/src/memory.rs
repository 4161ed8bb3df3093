//! Storage doubles for service tests: an in-memory store implementing both
//! repository contracts, and a store whose every call fails.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::departement::repository::DepartementRepository;
use crate::domain::{Departement, DepartementDraft, Ville, VilleDraft};
use crate::errors::ServiceError;
use crate::ville::repository::VilleRepository;

#[derive(Default)]
struct Tables {
    departements: BTreeMap<i32, (String, String)>,
    villes: BTreeMap<i32, Ville>,
    last_departement_id: i32,
    last_ville_id: i32,
}

impl Tables {
    fn departement(&self, id: i32) -> Option<Departement> {
        let (nom, code) = self.departements.get(&id)?;
        let villes = self.villes.values().filter(|v| v.departement_id == Some(id)).cloned().collect();
        Some(Departement { id, nom: nom.clone(), code: code.clone(), villes })
    }

    fn upsert_ville(&mut self, draft: VilleDraft) -> Result<Ville, ServiceError> {
        if let Some(departement_id) = draft.departement_id {
            if !self.departements.contains_key(&departement_id) {
                return Err(ServiceError::db(format!("foreign key violation: departement {departement_id}")));
            }
        }
        let id = match draft.id {
            Some(id) if self.villes.contains_key(&id) => id,
            Some(id) => return Err(ServiceError::db(format!("ville {id} not updated"))),
            None => {
                self.last_ville_id += 1;
                self.last_ville_id
            }
        };
        let ville = Ville { id, nom: draft.nom, nb_habitants: draft.nb_habitants, departement_id: draft.departement_id };
        self.villes.insert(id, ville.clone());
        Ok(ville)
    }

    fn villes_where(&self, keep: impl Fn(&Ville) -> bool) -> Vec<Ville> {
        self.villes.values().filter(|v| keep(v)).cloned().collect()
    }
}

/// Both aggregates behind one async mutex; ids are never reused.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl DepartementRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Departement>, ServiceError> {
        let tables = self.tables.lock().await;
        Ok(tables.departements.keys().filter_map(|id| tables.departement(*id)).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Departement>, ServiceError> {
        Ok(self.tables.lock().await.departement(id))
    }

    async fn save(&self, draft: DepartementDraft) -> Result<Departement, ServiceError> {
        let mut tables = self.tables.lock().await;
        let id = match draft.id {
            Some(id) if tables.departements.contains_key(&id) => id,
            Some(id) => return Err(ServiceError::db(format!("departement {id} not updated"))),
            None => {
                tables.last_departement_id += 1;
                tables.last_departement_id
            }
        };
        tables.departements.insert(id, (draft.nom, draft.code));

        let kept: HashSet<i32> = draft.villes.iter().filter_map(|v| v.id).collect();
        tables.villes.retain(|vid, v| v.departement_id != Some(id) || kept.contains(vid));
        for ville in draft.villes {
            tables.upsert_ville(VilleDraft { departement_id: Some(id), ..ville })?;
        }
        tables.departement(id).ok_or_else(|| ServiceError::db("departement vanished"))
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        let mut tables = self.tables.lock().await;
        tables.villes.retain(|_, v| v.departement_id != Some(id));
        tables.departements.remove(&id);
        Ok(())
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(self.tables.lock().await.departements.contains_key(&id))
    }
}

#[async_trait]
impl VilleRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Ville>, ServiceError> {
        Ok(self.tables.lock().await.villes_where(|_| true))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Ville>, ServiceError> {
        Ok(self.tables.lock().await.villes.get(&id).cloned())
    }

    async fn save(&self, draft: VilleDraft) -> Result<Ville, ServiceError> {
        self.tables.lock().await.upsert_ville(draft)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        self.tables.lock().await.villes.remove(&id);
        Ok(())
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(self.tables.lock().await.villes.contains_key(&id))
    }

    async fn find_by_nom_like(&self, pattern: &str) -> Result<Vec<Ville>, ServiceError> {
        let pattern: Vec<char> = pattern.chars().collect();
        Ok(self.tables.lock().await.villes_where(|v| like(&pattern, &v.nom.chars().collect::<Vec<_>>())))
    }

    async fn find_by_nb_habitants_greater_than(&self, threshold: i32) -> Result<Vec<Ville>, ServiceError> {
        Ok(self.tables.lock().await.villes_where(|v| v.nb_habitants > threshold))
    }

    async fn find_by_nb_habitants_between(&self, min: i32, max: i32) -> Result<Vec<Ville>, ServiceError> {
        Ok(self.tables.lock().await.villes_where(|v| (min..=max).contains(&v.nb_habitants)))
    }
}

/// `LIKE` with `%` and `_` wildcards and `\` escapes, ASCII
/// case-insensitive like SQLite.
fn like(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((&'\\', [c, rest @ ..])) => {
            text.first().is_some_and(|t| t.eq_ignore_ascii_case(c)) && like(rest, &text[1..])
        }
        Some((&'%', rest)) => (0..=text.len()).any(|i| like(rest, &text[i..])),
        Some((&'_', rest)) => !text.is_empty() && like(rest, &text[1..]),
        Some((c, rest)) => text.first().is_some_and(|t| t.eq_ignore_ascii_case(c)) && like(rest, &text[1..]),
    }
}

/// Every call fails with a storage error carrying `cause`.
pub struct FailingStore {
    cause: String,
}

impl FailingStore {
    pub fn new(cause: impl Into<String>) -> Self { Self { cause: cause.into() } }

    fn fail<T>(&self) -> Result<T, ServiceError> { Err(ServiceError::db(&self.cause)) }
}

#[async_trait]
impl DepartementRepository for FailingStore {
    async fn find_all(&self) -> Result<Vec<Departement>, ServiceError> { self.fail() }
    async fn find_by_id(&self, _id: i32) -> Result<Option<Departement>, ServiceError> { self.fail() }
    async fn save(&self, _draft: DepartementDraft) -> Result<Departement, ServiceError> { self.fail() }
    async fn delete_by_id(&self, _id: i32) -> Result<(), ServiceError> { self.fail() }
    async fn exists_by_id(&self, _id: i32) -> Result<bool, ServiceError> { self.fail() }
}

#[async_trait]
impl VilleRepository for FailingStore {
    async fn find_all(&self) -> Result<Vec<Ville>, ServiceError> { self.fail() }
    async fn find_by_id(&self, _id: i32) -> Result<Option<Ville>, ServiceError> { self.fail() }
    async fn save(&self, _draft: VilleDraft) -> Result<Ville, ServiceError> { self.fail() }
    async fn delete_by_id(&self, _id: i32) -> Result<(), ServiceError> { self.fail() }
    async fn exists_by_id(&self, _id: i32) -> Result<bool, ServiceError> { self.fail() }
    async fn find_by_nom_like(&self, _pattern: &str) -> Result<Vec<Ville>, ServiceError> { self.fail() }
    async fn find_by_nb_habitants_greater_than(&self, _threshold: i32) -> Result<Vec<Ville>, ServiceError> {
        self.fail()
    }
    async fn find_by_nb_habitants_between(&self, _min: i32, _max: i32) -> Result<Vec<Ville>, ServiceError> {
        self.fail()
    }
}
