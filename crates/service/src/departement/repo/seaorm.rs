use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use models::{departement, ville};

use crate::departement::repository::DepartementRepository;
use crate::domain::{Departement, DepartementDraft, Ville};
use crate::errors::ServiceError;

/// SeaORM-backed repository implementation.
pub struct SeaOrmDepartementRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmDepartementRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

async fn load_villes<C: ConnectionTrait>(conn: &C, departement_id: i32) -> Result<Vec<Ville>, ServiceError> {
    let rows = ville::Entity::find()
        .filter(ville::Column::DepartementId.eq(departement_id))
        .order_by_asc(ville::Column::Id)
        .all(conn)
        .await
        .map_err(ServiceError::db)?;
    Ok(rows.into_iter().map(Ville::from).collect())
}

#[async_trait::async_trait]
impl DepartementRepository for SeaOrmDepartementRepository {
    async fn find_all(&self) -> Result<Vec<Departement>, ServiceError> {
        let rows = departement::Entity::find()
            .order_by_asc(departement::Column::Id)
            .all(&self.db)
            .await
            .map_err(ServiceError::db)?;
        let villes = ville::Entity::find()
            .filter(ville::Column::DepartementId.is_not_null())
            .order_by_asc(ville::Column::Id)
            .all(&self.db)
            .await
            .map_err(ServiceError::db)?;

        let mut by_departement: HashMap<i32, Vec<Ville>> = HashMap::new();
        for v in villes {
            if let Some(departement_id) = v.departement_id {
                by_departement.entry(departement_id).or_default().push(v.into());
            }
        }
        Ok(rows
            .into_iter()
            .map(|m| {
                let villes = by_departement.remove(&m.id).unwrap_or_default();
                Departement::from_parts(m, villes)
            })
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Departement>, ServiceError> {
        let Some(model) = departement::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(ServiceError::db)?
        else {
            return Ok(None);
        };
        let villes = load_villes(&self.db, model.id).await?;
        Ok(Some(Departement::from_parts(model, villes)))
    }

    async fn save(&self, draft: DepartementDraft) -> Result<Departement, ServiceError> {
        let DepartementDraft { id, nom, code, villes } = draft;
        let txn = self.db.begin().await.map_err(ServiceError::db)?;

        let model = match id {
            None => {
                departement::ActiveModel { nom: Set(nom), code: Set(code), ..Default::default() }
                    .insert(&txn)
                    .await
            }
            Some(id) => departement::ActiveModel { id: Set(id), nom: Set(nom), code: Set(code) }.update(&txn).await,
        }
        .map_err(ServiceError::db)?;

        // orphan removal: stored cities the draft no longer holds
        let kept: HashSet<i32> = villes.iter().filter_map(|v| v.id).collect();
        let orphans: Vec<i32> = ville::Entity::find()
            .filter(ville::Column::DepartementId.eq(model.id))
            .all(&txn)
            .await
            .map_err(ServiceError::db)?
            .into_iter()
            .map(|v| v.id)
            .filter(|id| !kept.contains(id))
            .collect();
        if !orphans.is_empty() {
            ville::Entity::delete_many()
                .filter(ville::Column::Id.is_in(orphans))
                .exec(&txn)
                .await
                .map_err(ServiceError::db)?;
        }

        for v in villes {
            let am = ville::ActiveModel {
                nom: Set(v.nom),
                nb_habitants: Set(v.nb_habitants),
                departement_id: Set(Some(model.id)),
                ..Default::default()
            };
            let written = match v.id {
                None => am.insert(&txn).await,
                Some(ville_id) => ville::ActiveModel { id: Set(ville_id), ..am }.update(&txn).await,
            };
            written.map_err(ServiceError::db)?;
        }

        let villes = load_villes(&txn, model.id).await?;
        txn.commit().await.map_err(ServiceError::db)?;
        Ok(Departement::from_parts(model, villes))
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db)?;
        ville::Entity::delete_many()
            .filter(ville::Column::DepartementId.eq(id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db)?;
        departement::Entity::delete_by_id(id).exec(&txn).await.map_err(ServiceError::db)?;
        txn.commit().await.map_err(ServiceError::db)?;
        Ok(())
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError> {
        let found = departement::Entity::find_by_id(id).one(&self.db).await.map_err(ServiceError::db)?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VilleDraft;
    use crate::test_support::get_db;

    async fn repo() -> anyhow::Result<SeaOrmDepartementRepository> {
        Ok(SeaOrmDepartementRepository::new(get_db().await?))
    }

    fn nord_with_villes() -> DepartementDraft {
        let mut draft = DepartementDraft::new("Nord", "59");
        draft.add_ville(VilleDraft::new("Lille", 230_000));
        draft.add_ville(VilleDraft::new("Roubaix", 98_000));
        draft
    }

    #[tokio::test]
    async fn save_assigns_ids_and_round_trips() -> anyhow::Result<()> {
        let repo = repo().await?;
        let saved = repo.save(nord_with_villes()).await?;
        assert!(saved.id > 0);
        assert_eq!(saved.villes.len(), 2);
        assert!(saved.villes.iter().all(|v| v.departement_id == Some(saved.id)));
        assert!(saved.villes[0].id < saved.villes[1].id);

        let found = repo.find_by_id(saved.id).await?;
        assert_eq!(found, Some(saved.clone()));
        assert!(repo.exists_by_id(saved.id).await?);
        assert!(!repo.exists_by_id(saved.id + 1000).await?);
        Ok(())
    }

    #[tokio::test]
    async fn save_with_id_replaces_fields_and_keeps_identity() -> anyhow::Result<()> {
        let repo = repo().await?;
        let saved = repo.save(nord_with_villes()).await?;
        let mut draft = saved.clone().into_draft();
        draft.nom = "Nord-Pas".into();
        draft.code = "59A".into();
        let updated = repo.save(draft).await?;
        assert_eq!(updated.id, saved.id);
        assert_eq!(updated.nom, "Nord-Pas");
        assert_eq!(updated.villes, saved.villes);
        assert_eq!(repo.find_all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn villes_removed_from_the_draft_are_deleted() -> anyhow::Result<()> {
        let db = get_db().await?;
        let repo = SeaOrmDepartementRepository::new(db.clone());
        let saved = repo.save(nord_with_villes()).await?;
        let lille = saved.villes[0].id;

        let mut draft = saved.into_draft();
        assert!(draft.remove_ville(lille));
        let updated = repo.save(draft).await?;
        assert_eq!(updated.villes.len(), 1);

        let row = ville::Entity::find_by_id(lille).one(&db).await?;
        assert!(row.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn delete_cascades_and_is_idempotent() -> anyhow::Result<()> {
        let db = get_db().await?;
        let repo = SeaOrmDepartementRepository::new(db.clone());
        let nord = repo.save(nord_with_villes()).await?;
        let sud = repo.save(DepartementDraft::new("Sud", "13")).await?;

        repo.delete_by_id(nord.id).await?;
        assert!(repo.find_by_id(nord.id).await?.is_none());
        for v in &nord.villes {
            assert!(ville::Entity::find_by_id(v.id).one(&db).await?.is_none());
        }

        repo.delete_by_id(nord.id).await?;
        let remaining = repo.find_all().await?;
        assert_eq!(remaining, vec![sud]);
        Ok(())
    }

    #[tokio::test]
    async fn find_all_groups_villes_per_departement() -> anyhow::Result<()> {
        let repo = repo().await?;
        let nord = repo.save(nord_with_villes()).await?;
        let mut sud = DepartementDraft::new("Bouches-du-Rhône", "13");
        sud.add_ville(VilleDraft::new("Marseille", 870_000));
        let sud = repo.save(sud).await?;

        let all = repo.find_all().await?;
        assert_eq!(all.iter().map(|d| d.id).collect::<Vec<_>>(), vec![nord.id, sud.id]);
        assert_eq!(all[0].villes.len(), 2);
        assert_eq!(all[1].villes[0].nom, "Marseille");
        Ok(())
    }
}
