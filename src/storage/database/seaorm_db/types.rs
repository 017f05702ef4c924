use sea_orm::DatabaseConnection;

/// SeaORM-backed job store
#[derive(Debug, Clone)]
pub struct SeaOrmJobStore {
    pub(super) db: DatabaseConnection,
    /// Backend type indicator
    pub(super) backend_type: DatabaseBackendType,
}

/// Database backend type indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackendType {
    PostgreSQL,
    SQLite,
}

impl DatabaseBackendType {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            DatabaseBackendType::PostgreSQL
        } else {
            DatabaseBackendType::SQLite
        }
    }
}
