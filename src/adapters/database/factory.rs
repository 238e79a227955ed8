//! Store factory
//!
//! This module creates the configured store backend.

use crate::adapters::database::traits::ClinicStore;
use crate::adapters::memory::MemoryStore;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::store::PostgreSQLStore;
use crate::config::schema::{ClinicConfig, DatabaseTarget};
use crate::domain::{ClinicError, Result};
use std::sync::Arc;

/// Create a store based on the configuration
///
/// This factory function examines the `database_target` in the configuration
/// and creates the matching backend. The schema is not touched here; call
/// [`ClinicStore::ensure_schema`] when the store should bootstrap it.
///
/// # Arguments
///
/// * `config` - The clinic configuration
///
/// # Errors
///
/// Returns an error if the backend cannot be created
pub async fn create_store(config: &ClinicConfig) -> Result<Arc<dyn ClinicStore>> {
    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                ClinicError::Configuration(
                    "postgresql configuration is required when database_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL store");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;

            Ok(Arc::new(PostgreSQLStore::new(client)) as Arc<dyn ClinicStore>)
        }
        DatabaseTarget::Memory => {
            tracing::warn!("Creating in-memory store; records are lost when the process exits");

            Ok(Arc::new(MemoryStore::new()) as Arc<dyn ClinicStore>)
        }
    }
}
