#![cfg(test)]
use sea_orm::DatabaseConnection;

/// Fresh migrated SQLite in-memory database; every call is isolated.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    models::db::connect_in_memory().await
}
