use async_trait::async_trait;

use crate::domain::{Departement, DepartementDraft};
use crate::errors::ServiceError;

/// Persistence of department aggregates together with their cities.
#[async_trait]
pub trait DepartementRepository: Send + Sync {
    /// All departments, ascending id.
    async fn find_all(&self) -> Result<Vec<Departement>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Departement>, ServiceError>;
    /// Insert when `draft.id` is `None`, full replace otherwise. The city
    /// collection is synchronised: new cities inserted, known ones replaced,
    /// cities missing from the draft deleted.
    async fn save(&self, draft: DepartementDraft) -> Result<Departement, ServiceError>;
    /// Removes the department and its cities; absent ids are a no-op.
    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError>;
    async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError>;
}
