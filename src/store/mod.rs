//! Persistence layer — libSQL-backed profile storage.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::ProfileStore;

use crate::config::OnboardingConfig;

/// Open the configured on-disk profile store.
pub async fn open_store(config: &OnboardingConfig) -> crate::error::Result<LibSqlBackend> {
    Ok(LibSqlBackend::new_local(&config.db_path).await?)
}
