use thiserror::Error;
use tracing::error;

/// Caller-facing messages naming only the attempted operation.
pub mod actions {
    pub const FETCH_DEPARTEMENTS: &str = "Impossible de récupérer les départements";
    pub const FETCH_DEPARTEMENT: &str = "Impossible de récupérer le département";
    pub const ADD_DEPARTEMENT: &str = "Impossible d'ajouter le département";
    pub const DELETE_DEPARTEMENT: &str = "Impossible de supprimer le département";
    pub const UPDATE_DEPARTEMENT: &str = "Impossible de mettre à jour le département";
    pub const EXPORT_DEPARTEMENTS: &str = "Impossible d'exporter les départements";
    pub const FETCH_VILLES: &str = "Impossible de récupérer les villes";
    pub const FETCH_VILLE: &str = "Impossible de récupérer la ville";
    pub const ADD_VILLE: &str = "Impossible d'ajouter la ville";
    pub const DELETE_VILLE: &str = "Impossible de supprimer la ville";
    pub const UPDATE_VILLE: &str = "Impossible de mettre à jour la ville";
    pub const EXPORT_VILLES: &str = "Impossible d'exporter les villes";
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// A storage fault already reduced to its generic, operation-level message.
    #[error("{0}")]
    Failed(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} introuvable", entity)) }

    pub fn db(err: impl std::fmt::Display) -> Self { Self::Db(err.to_string()) }

    /// Replaces storage detail with the generic message for `action`.
    /// Validation and not-found outcomes pass through untouched; the hidden
    /// cause is logged.
    pub fn masked(self, action: &'static str) -> Self {
        match self {
            ServiceError::Db(cause) => {
                error!(action, %cause, "storage operation failed");
                ServiceError::Failed(action.to_string())
            }
            ServiceError::Model(e) => ServiceError::Validation(e.message().to_string()),
            other => other,
        }
    }

    /// Message safe to hand back to API callers.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Validation(msg) | ServiceError::NotFound(msg) | ServiceError::Failed(msg) => msg.clone(),
            ServiceError::Model(e) => e.message().to_string(),
            ServiceError::Db(_) => "Opération impossible".to_string(),
        }
    }
}

/// `map_err` adapter applying [`ServiceError::masked`].
pub fn mask(action: &'static str) -> impl Fn(ServiceError) -> ServiceError {
    move |e| e.masked(action)
}
