use std::sync::Arc;

use tracing::{info, instrument};

use super::repository::{escape_like, VilleRepository};
use crate::departement::repository::DepartementRepository;
use crate::domain::{Ville, VilleDraft, VilleInput};
use crate::errors::{actions, mask, ServiceError};
use crate::export::to_csv;
use crate::locks::{AggregateGuard, AggregateLocks};
use crate::population::PopulationRange;

/// City operations that do not go through a department.
///
/// Writes touching a city attached to a department take that department's
/// lock, shared with [`crate::departement::DepartementService`].
pub struct VilleService {
    villes: Arc<dyn VilleRepository>,
    departements: Arc<dyn DepartementRepository>,
    locks: Arc<AggregateLocks>,
}

impl VilleService {
    pub fn new(
        villes: Arc<dyn VilleRepository>,
        departements: Arc<dyn DepartementRepository>,
        locks: Arc<AggregateLocks>,
    ) -> Self {
        Self { villes, departements, locks }
    }

    async fn ensure_departement(&self, departement_id: Option<i32>) -> Result<(), ServiceError> {
        if let Some(id) = departement_id {
            if !self.departements.exists_by_id(id).await? {
                return Err(ServiceError::not_found("Département"));
            }
        }
        Ok(())
    }

    /// Loads city `id` with its department locked, plus `target` when given.
    /// The owner is re-read under the locks and the locking retried if the
    /// city moved in between. `None` when the city does not exist.
    async fn lock_owner(
        &self,
        id: i32,
        target: Option<i32>,
    ) -> Result<Option<(Ville, Vec<AggregateGuard>)>, ServiceError> {
        let Some(mut owner) = self.villes.find_by_id(id).await?.map(|v| v.departement_id) else {
            return Ok(None);
        };
        loop {
            let guards = self.locks.acquire_many(owner.into_iter().chain(target)).await;
            match self.villes.find_by_id(id).await? {
                None => return Ok(None),
                Some(ville) if ville.departement_id == owner => return Ok(Some((ville, guards))),
                Some(ville) => owner = ville.departement_id,
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn list_villes(&self) -> Result<Vec<Ville>, ServiceError> {
        self.villes.find_all().await.map_err(mask(actions::FETCH_VILLES))
    }

    #[instrument(skip(self))]
    pub async fn get_ville(&self, id: i32) -> Result<Ville, ServiceError> {
        self.villes
            .find_by_id(id)
            .await
            .map_err(mask(actions::FETCH_VILLE))?
            .ok_or_else(|| ServiceError::not_found("Ville"))
    }

    /// Stores a new city, attached to `input.departement_id` when given.
    #[instrument(skip(self, input), fields(nom = %input.nom, departement_id = ?input.departement_id))]
    pub async fn add_ville(&self, input: VilleInput) -> Result<Ville, ServiceError> {
        let on_err = mask(actions::ADD_VILLE);
        input.validate().map_err(&on_err)?;

        let _guards = self.locks.acquire_many(input.departement_id).await;
        self.ensure_departement(input.departement_id).await.map_err(&on_err)?;
        let saved = self.villes.save(input.into_draft()).await.map_err(&on_err)?;
        info!(ville_id = saved.id, event = "ville_added", "ville added");
        Ok(saved)
    }

    /// Deletes the city if present and returns the remaining list.
    #[instrument(skip(self))]
    pub async fn delete_ville(&self, id: i32) -> Result<Vec<Ville>, ServiceError> {
        let on_err = mask(actions::DELETE_VILLE);
        if let Some((_, _guards)) = self.lock_owner(id, None).await.map_err(&on_err)? {
            self.villes.delete_by_id(id).await.map_err(&on_err)?;
            info!(ville_id = id, event = "ville_deleted", "ville deleted");
        }
        self.villes.find_all().await.map_err(&on_err)
    }

    /// Replaces nom and population; the department link changes only when
    /// `input.departement_id` is given.
    #[instrument(skip(self, input), fields(nom = %input.nom))]
    pub async fn update_ville(&self, id: i32, input: VilleInput) -> Result<Vec<Ville>, ServiceError> {
        let on_err = mask(actions::UPDATE_VILLE);
        input.validate().map_err(&on_err)?;

        let (existing, _guards) = self
            .lock_owner(id, input.departement_id)
            .await
            .map_err(&on_err)?
            .ok_or_else(|| ServiceError::not_found("Ville"))?;
        let departement_id = input.departement_id.or(existing.departement_id);
        if departement_id != existing.departement_id {
            self.ensure_departement(departement_id).await.map_err(&on_err)?;
        }

        let draft = VilleDraft { id: Some(id), nom: input.nom, nb_habitants: input.nb_habitants, departement_id };
        self.villes.save(draft).await.map_err(&on_err)?;
        info!(ville_id = id, event = "ville_updated", "ville updated");
        self.villes.find_all().await.map_err(&on_err)
    }

    /// Cities whose name contains `fragment`; `%` and `_` match literally.
    #[instrument(skip(self))]
    pub async fn search_by_nom(&self, fragment: &str) -> Result<Vec<Ville>, ServiceError> {
        let pattern = format!("%{}%", escape_like(fragment));
        self.villes.find_by_nom_like(&pattern).await.map_err(mask(actions::FETCH_VILLES))
    }

    /// Strictly more than `min` inhabitants.
    #[instrument(skip(self))]
    pub async fn population_greater_than(&self, min: i32) -> Result<Vec<Ville>, ServiceError> {
        self.villes.find_by_nb_habitants_greater_than(min).await.map_err(mask(actions::FETCH_VILLES))
    }

    #[instrument(skip(self))]
    pub async fn population_between(&self, min: i32, max: i32) -> Result<Vec<Ville>, ServiceError> {
        let range = PopulationRange::new(min, max)?;
        self.villes
            .find_by_nb_habitants_between(range.min(), range.max())
            .await
            .map_err(mask(actions::FETCH_VILLES))
    }

    /// `id,nom,nbHabitants` rows, one per city.
    #[instrument(skip(self))]
    pub async fn export_csv(&self) -> Result<String, ServiceError> {
        let villes = self.villes.find_all().await.map_err(mask(actions::EXPORT_VILLES))?;
        info!(rows = villes.len(), event = "villes_exported", "villes exported");
        Ok(to_csv(&villes))
    }
}
