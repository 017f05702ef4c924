//! Database storage implementation using SeaORM
//!
//! Jobs and job details live in two tables, `jobs` and `job_details`.

/// Database entities module
pub mod entities;
/// Database migration module
pub mod migration;
/// SeaORM job store module
pub mod seaorm_db;

pub use seaorm_db::{DatabaseBackendType, SeaOrmJobStore};
