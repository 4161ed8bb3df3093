use std::sync::Arc;

use sea_orm::DatabaseConnection;

use service::departement::repo::seaorm::SeaOrmDepartementRepository;
use service::departement::repository::DepartementRepository;
use service::locks::AggregateLocks;
use service::ville::repo::seaorm::SeaOrmVilleRepository;
use service::ville::repository::VilleRepository;
use service::{DepartementService, VilleService};

/// Shared handler state: both services over one lock registry.
#[derive(Clone)]
pub struct AppState {
    pub departements: Arc<DepartementService>,
    pub villes: Arc<VilleService>,
}

impl AppState {
    /// SeaORM repositories over one connection pool.
    pub fn from_db(db: DatabaseConnection) -> Self {
        let departements = Arc::new(SeaOrmDepartementRepository::new(db.clone()));
        let villes = Arc::new(SeaOrmVilleRepository::new(db));
        Self::from_repositories(departements, villes)
    }

    pub fn from_repositories(
        departements: Arc<dyn DepartementRepository>,
        villes: Arc<dyn VilleRepository>,
    ) -> Self {
        let locks = Arc::new(AggregateLocks::new());
        Self {
            departements: Arc::new(DepartementService::new(departements.clone(), locks.clone())),
            villes: Arc::new(VilleService::new(villes, departements, locks)),
        }
    }
}
