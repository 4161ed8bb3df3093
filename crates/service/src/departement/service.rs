use std::sync::Arc;

use tracing::{info, instrument};

use super::repository::DepartementRepository;
use crate::domain::{Departement, DepartementDraft, DepartementInput, Ville, VilleInput};
use crate::errors::{actions, mask, ServiceError};
use crate::export::to_csv;
use crate::locks::AggregateLocks;
use crate::population::{self, PopulationRange, SortOrder};

/// Department aggregate operations, including every change to a
/// department's own city collection.
pub struct DepartementService {
    repo: Arc<dyn DepartementRepository>,
    locks: Arc<AggregateLocks>,
}

impl DepartementService {
    pub fn new(repo: Arc<dyn DepartementRepository>, locks: Arc<AggregateLocks>) -> Self { Self { repo, locks } }

    async fn load(&self, id: i32) -> Result<Departement, ServiceError> {
        self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("Département"))
    }

    #[instrument(skip(self))]
    pub async fn list_departements(&self) -> Result<Vec<Departement>, ServiceError> {
        self.repo.find_all().await.map_err(mask(actions::FETCH_DEPARTEMENTS))
    }

    #[instrument(skip(self))]
    pub async fn get_departement(&self, id: i32) -> Result<Departement, ServiceError> {
        self.load(id).await.map_err(mask(actions::FETCH_DEPARTEMENT))
    }

    /// Creates an empty department; any id in `input` is ignored.
    #[instrument(skip(self, input), fields(nom = %input.nom, code = %input.code))]
    pub async fn add_departement(&self, input: DepartementInput) -> Result<Departement, ServiceError> {
        let on_err = mask(actions::ADD_DEPARTEMENT);
        input.validate().map_err(&on_err)?;
        let saved = self.repo.save(DepartementDraft::new(input.nom, input.code)).await.map_err(&on_err)?;
        info!(departement_id = saved.id, event = "departement_added", "departement added");
        Ok(saved)
    }

    /// Replaces nom and code of the department named by `input.id`; its
    /// cities are kept.
    #[instrument(skip(self, input), fields(id = ?input.id))]
    pub async fn update_departement(&self, input: DepartementInput) -> Result<Departement, ServiceError> {
        let on_err = mask(actions::UPDATE_DEPARTEMENT);
        let Some(id) = input.id else {
            return Err(ServiceError::Validation("L'identifiant du département est obligatoire".into()));
        };
        input.validate().map_err(&on_err)?;

        let _guard = self.locks.acquire(id).await;
        let mut draft = self.load(id).await.map_err(&on_err)?.into_draft();
        draft.nom = input.nom;
        draft.code = input.code;
        let saved = self.repo.save(draft).await.map_err(&on_err)?;
        info!(departement_id = id, event = "departement_updated", "departement updated");
        Ok(saved)
    }

    /// Deletes the department with its cities and returns what remains.
    #[instrument(skip(self))]
    pub async fn delete_departement(&self, id: i32) -> Result<Vec<Departement>, ServiceError> {
        let on_err = mask(actions::DELETE_DEPARTEMENT);
        {
            let _guard = self.locks.acquire(id).await;
            self.repo.delete_by_id(id).await.map_err(&on_err)?;
        }
        info!(departement_id = id, event = "departement_deleted", "departement deleted");
        self.repo.find_all().await.map_err(&on_err)
    }

    #[instrument(skip(self))]
    pub async fn list_villes(&self, departement_id: i32) -> Result<Vec<Ville>, ServiceError> {
        Ok(self.load(departement_id).await.map_err(mask(actions::FETCH_VILLES))?.villes)
    }

    #[instrument(skip(self))]
    pub async fn get_ville(&self, departement_id: i32, ville_id: i32) -> Result<Ville, ServiceError> {
        let departement = self.load(departement_id).await.map_err(mask(actions::FETCH_VILLE))?;
        departement.ville(ville_id).cloned().ok_or_else(|| ServiceError::not_found("Ville"))
    }

    /// Appends a city to the department and returns the updated collection.
    #[instrument(skip(self, input), fields(nom = %input.nom))]
    pub async fn add_ville(&self, departement_id: i32, input: VilleInput) -> Result<Vec<Ville>, ServiceError> {
        let on_err = mask(actions::ADD_VILLE);
        input.validate().map_err(&on_err)?;

        let _guard = self.locks.acquire(departement_id).await;
        let mut draft = self.load(departement_id).await.map_err(&on_err)?.into_draft();
        draft.add_ville(input.into_draft());
        let saved = self.repo.save(draft).await.map_err(&on_err)?;
        info!(departement_id, event = "ville_added", villes = saved.villes.len(), "ville added to departement");
        Ok(saved.villes)
    }

    /// Detaches and deletes a city; unchanged collection when it is not there.
    #[instrument(skip(self))]
    pub async fn remove_ville(&self, departement_id: i32, ville_id: i32) -> Result<Vec<Ville>, ServiceError> {
        let on_err = mask(actions::DELETE_VILLE);
        let _guard = self.locks.acquire(departement_id).await;
        let departement = self.load(departement_id).await.map_err(&on_err)?;
        if departement.ville(ville_id).is_none() {
            return Ok(departement.villes);
        }
        let mut draft = departement.into_draft();
        draft.remove_ville(ville_id);
        let saved = self.repo.save(draft).await.map_err(&on_err)?;
        info!(departement_id, ville_id, event = "ville_removed", "ville removed from departement");
        Ok(saved.villes)
    }

    /// Replaces nom and population of a city in place; unchanged collection
    /// when it is not there.
    #[instrument(skip(self, input), fields(nom = %input.nom))]
    pub async fn update_ville(
        &self,
        departement_id: i32,
        ville_id: i32,
        input: VilleInput,
    ) -> Result<Vec<Ville>, ServiceError> {
        let on_err = mask(actions::UPDATE_VILLE);
        input.validate().map_err(&on_err)?;

        let _guard = self.locks.acquire(departement_id).await;
        let departement = self.load(departement_id).await.map_err(&on_err)?;
        if departement.ville(ville_id).is_none() {
            return Ok(departement.villes);
        }
        let mut draft = departement.into_draft();
        if let Some(ville) = draft.ville_mut(ville_id) {
            ville.nom = input.nom;
            ville.nb_habitants = input.nb_habitants;
        }
        let saved = self.repo.save(draft).await.map_err(&on_err)?;
        info!(departement_id, ville_id, event = "ville_updated", "ville updated in departement");
        Ok(saved.villes)
    }

    #[instrument(skip(self))]
    pub async fn sort_villes_by_population(
        &self,
        departement_id: i32,
        order: SortOrder,
    ) -> Result<Vec<Ville>, ServiceError> {
        let villes = self.list_villes(departement_id).await?;
        Ok(population::sort_by_population(villes, order))
    }

    #[instrument(skip(self))]
    pub async fn top_villes(&self, departement_id: i32, limit: usize) -> Result<Vec<Ville>, ServiceError> {
        let villes = self.list_villes(departement_id).await?;
        Ok(population::most_populous(villes, limit))
    }

    #[instrument(skip(self))]
    pub async fn filter_villes_by_population(
        &self,
        departement_id: i32,
        min: i32,
        max: i32,
    ) -> Result<Vec<Ville>, ServiceError> {
        let range = PopulationRange::new(min, max)?;
        let villes = self.list_villes(departement_id).await?;
        Ok(population::filter_by_population(villes, range))
    }

    /// `id,nom` rows, one per department.
    #[instrument(skip(self))]
    pub async fn export_csv(&self) -> Result<String, ServiceError> {
        let departements = self.repo.find_all().await.map_err(mask(actions::EXPORT_DEPARTEMENTS))?;
        info!(rows = departements.len(), event = "departements_exported", "departements exported");
        Ok(to_csv(&departements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FailingStore, InMemoryStore};

    fn service() -> DepartementService {
        DepartementService::new(Arc::new(InMemoryStore::new()), Arc::new(AggregateLocks::new()))
    }

    fn departement(nom: &str, code: &str) -> DepartementInput {
        DepartementInput { id: None, nom: nom.into(), code: code.into() }
    }

    fn ville(nom: &str, nb_habitants: i32) -> VilleInput {
        VilleInput { nom: nom.into(), nb_habitants, departement_id: None }
    }

    async fn rhone_with_villes(svc: &DepartementService) -> anyhow::Result<Departement> {
        let rhone = svc.add_departement(departement("Rhône", "69")).await?;
        for (nom, nb) in [("Lyon", 500_000), ("Bron", 40_000), ("Vénissieux", 65_000), ("Givors", 40_000)] {
            svc.add_ville(rhone.id, ville(nom, nb)).await?;
        }
        Ok(svc.get_departement(rhone.id).await?)
    }

    fn noms(villes: &[Ville]) -> Vec<&str> {
        villes.iter().map(|v| v.nom.as_str()).collect()
    }

    #[tokio::test]
    async fn add_then_get_round_trips() -> anyhow::Result<()> {
        let svc = service();
        let added = svc.add_departement(departement("Nord", "59")).await?;
        assert_eq!(svc.get_departement(added.id).await?, added);
        assert_eq!(svc.list_departements().await?, vec![added]);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_storage() {
        let svc = DepartementService::new(Arc::new(FailingStore::new("down")), Arc::new(AggregateLocks::new()));
        let err = svc.add_departement(departement("No", "59")).await.unwrap_err();
        assert_eq!(err.public_message(), "Le nom du département doit contenir entre 3 et 50 caractères");
        let err = svc.add_departement(departement("Nord", "5")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn storage_failures_are_masked() {
        let svc = DepartementService::new(Arc::new(FailingStore::new("disk full")), Arc::new(AggregateLocks::new()));
        let err = svc.list_departements().await.unwrap_err();
        assert_eq!(err.public_message(), actions::FETCH_DEPARTEMENTS);
        let err = svc.add_departement(departement("Nord", "59")).await.unwrap_err();
        assert_eq!(err.public_message(), actions::ADD_DEPARTEMENT);
        let err = svc.export_csv().await.unwrap_err();
        assert!(matches!(err, ServiceError::Failed(ref m) if m == actions::EXPORT_DEPARTEMENTS));
    }

    #[tokio::test]
    async fn missing_departement_is_not_found() {
        let svc = service();
        assert!(matches!(svc.get_departement(404).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.list_villes(404).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.add_ville(404, ville("Lyon", 1)).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_requires_a_known_id_and_keeps_villes() -> anyhow::Result<()> {
        let svc = service();
        let rhone = rhone_with_villes(&svc).await?;

        let err = svc.update_departement(departement("Rhône", "69")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let unknown = DepartementInput { id: Some(rhone.id + 100), ..departement("Rhône", "69") };
        assert!(matches!(svc.update_departement(unknown).await, Err(ServiceError::NotFound(_))));

        let input = DepartementInput { id: Some(rhone.id), ..departement("Rhône-Alpes", "69R") };
        let updated = svc.update_departement(input).await?;
        assert_eq!(updated.id, rhone.id);
        assert_eq!((updated.nom.as_str(), updated.code.as_str()), ("Rhône-Alpes", "69R"));
        assert_eq!(updated.villes, rhone.villes);
        Ok(())
    }

    #[tokio::test]
    async fn delete_cascades_and_is_idempotent() -> anyhow::Result<()> {
        let svc = service();
        let rhone = rhone_with_villes(&svc).await?;
        let nord = svc.add_departement(departement("Nord", "59")).await?;

        assert_eq!(svc.delete_departement(rhone.id).await?, vec![nord.clone()]);
        assert_eq!(svc.delete_departement(rhone.id).await?, vec![nord]);
        assert!(matches!(svc.list_villes(rhone.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn add_ville_sets_back_reference() -> anyhow::Result<()> {
        let svc = service();
        let rhone = rhone_with_villes(&svc).await?;
        assert_eq!(noms(&rhone.villes), vec!["Lyon", "Bron", "Vénissieux", "Givors"]);
        assert!(rhone.villes.iter().all(|v| v.departement_id == Some(rhone.id)));

        let lyon = svc.get_ville(rhone.id, rhone.villes[0].id).await?;
        assert_eq!(lyon.nb_habitants, 500_000);
        assert!(matches!(svc.get_ville(rhone.id, 9_999).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn ville_of_another_departement_is_not_found() -> anyhow::Result<()> {
        let svc = service();
        let rhone = rhone_with_villes(&svc).await?;
        let nord = svc.add_departement(departement("Nord", "59")).await?;
        let lyon = rhone.villes[0].id;
        assert!(matches!(svc.get_ville(nord.id, lyon).await, Err(ServiceError::NotFound(_))));
        assert!(svc.remove_ville(nord.id, lyon).await?.is_empty());
        assert_eq!(svc.list_villes(rhone.id).await?.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn remove_and_update_ville() -> anyhow::Result<()> {
        let svc = service();
        let rhone = rhone_with_villes(&svc).await?;
        let (lyon, bron) = (rhone.villes[0].id, rhone.villes[1].id);

        let villes = svc.remove_ville(rhone.id, bron).await?;
        assert_eq!(noms(&villes), vec!["Lyon", "Vénissieux", "Givors"]);
        assert_eq!(svc.remove_ville(rhone.id, bron).await?, villes);

        let villes = svc.update_ville(rhone.id, lyon, ville("Lyon Métropole", 520_000)).await?;
        assert_eq!(villes[0].id, lyon);
        assert_eq!(villes[0].nom, "Lyon Métropole");
        assert_eq!(villes[0].nb_habitants, 520_000);
        assert_eq!(svc.update_ville(rhone.id, bron, ville("Bron", 1)).await?, villes);

        let err = svc.update_ville(rhone.id, lyon, ville("Lyon", -1)).await.unwrap_err();
        assert_eq!(err.public_message(), "Le nombre d'habitants de la ville doit être positif ou nul");
        Ok(())
    }

    #[tokio::test]
    async fn population_views_do_not_touch_storage() -> anyhow::Result<()> {
        let svc = service();
        let rhone = rhone_with_villes(&svc).await?;

        let asc = svc.sort_villes_by_population(rhone.id, SortOrder::Asc).await?;
        assert_eq!(noms(&asc), vec!["Bron", "Givors", "Vénissieux", "Lyon"]);
        let desc = svc.sort_villes_by_population(rhone.id, SortOrder::Desc).await?;
        assert_eq!(noms(&desc), vec!["Lyon", "Vénissieux", "Bron", "Givors"]);
        assert_eq!(noms(&svc.top_villes(rhone.id, 2).await?), vec!["Lyon", "Vénissieux"]);

        let ranged = svc.filter_villes_by_population(rhone.id, 40_000, 65_000).await?;
        assert_eq!(noms(&ranged), vec!["Bron", "Vénissieux", "Givors"]);
        let err = svc.filter_villes_by_population(rhone.id, 10, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        assert_eq!(svc.list_villes(rhone.id).await?, rhone.villes);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_adds_on_one_departement_are_all_kept() -> anyhow::Result<()> {
        let svc = Arc::new(service());
        let id = svc.add_departement(departement("Rhône", "69")).await?.id;
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move { svc.add_ville(id, ville(&format!("Ville {i}"), i)).await })
            })
            .collect();
        for task in tasks {
            task.await??;
        }
        assert_eq!(svc.list_villes(id).await?.len(), 16);
        Ok(())
    }

    #[tokio::test]
    async fn not_found_mutations_leave_no_lock_entries() -> anyhow::Result<()> {
        let locks = Arc::new(AggregateLocks::new());
        let svc = DepartementService::new(Arc::new(InMemoryStore::new()), Arc::clone(&locks));
        for id in 1_000..1_200 {
            assert!(matches!(svc.add_ville(id, ville("Lyon", 1)).await, Err(ServiceError::NotFound(_))));
            assert!(matches!(svc.update_ville(id, 1, ville("Lyon", 1)).await, Err(ServiceError::NotFound(_))));
            assert!(matches!(svc.remove_ville(id, 1).await, Err(ServiceError::NotFound(_))));
            let unknown = DepartementInput { id: Some(id), ..departement("Rhône", "69") };
            assert!(matches!(svc.update_departement(unknown).await, Err(ServiceError::NotFound(_))));
        }
        assert_eq!(locks.tracked(), 0);

        let rhone = rhone_with_villes(&svc).await?;
        svc.delete_departement(rhone.id).await?;
        assert_eq!(locks.tracked(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn export_lists_every_departement() -> anyhow::Result<()> {
        let svc = service();
        svc.add_departement(departement("Nord", "59")).await?;
        svc.add_departement(departement("Sud", "13")).await?;
        assert_eq!(svc.export_csv().await?, "id,nom\n1,Nord\n2,Sud\n");
        Ok(())
    }
}
