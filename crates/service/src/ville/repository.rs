use async_trait::async_trait;

use crate::domain::{Ville, VilleDraft};
use crate::errors::ServiceError;

/// Persistence of individual cities. Every list is in ascending id order.
#[async_trait]
pub trait VilleRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Ville>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Ville>, ServiceError>;
    /// Insert when `draft.id` is `None`, full replace otherwise.
    async fn save(&self, draft: VilleDraft) -> Result<Ville, ServiceError>;
    /// Absent ids are a no-op.
    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError>;
    async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError>;
    /// SQL `LIKE` semantics with `\` as escape character: the caller
    /// supplies the `%` wildcards.
    async fn find_by_nom_like(&self, pattern: &str) -> Result<Vec<Ville>, ServiceError>;
    /// Strictly greater than `threshold`.
    async fn find_by_nb_habitants_greater_than(&self, threshold: i32) -> Result<Vec<Ville>, ServiceError>;
    /// Inclusive at both bounds.
    async fn find_by_nb_habitants_between(&self, min: i32, max: i32) -> Result<Vec<Ville>, ServiceError>;
}

/// Escapes `LIKE` metacharacters so `fragment` matches literally.
pub fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
