//! Storage layer for the Gateway
//!
//! Two `JobStore` backends: an in-memory one and a SeaORM one (SQLite or PostgreSQL).

/// Database storage module
pub mod database;
/// In-memory storage module
pub mod memory;

pub use database::SeaOrmJobStore;
pub use memory::InMemoryJobStore;

use crate::config::StorageConfig;
use crate::core::jobs::JobStore;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Build the job store selected by configuration
pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn JobStore>> {
    if !config.database.enabled {
        info!("Database disabled, using in-memory job store");
        return Ok(Arc::new(InMemoryJobStore::new()));
    }

    debug!("Connecting to database");
    let store = SeaOrmJobStore::connect_and_migrate(&config.database).await?;
    info!(backend = ?store.backend_type(), "Job store ready");
    Ok(Arc::new(store))
}
