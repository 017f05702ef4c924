// Module declarations
mod connection;
mod job_ops;
mod types;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmJobStore};
