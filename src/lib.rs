//! # verification-gateway
//!
//! An internal gateway that submits identifiers (phone numbers, NPWP tax numbers and
//! NIK identity numbers) to external verification providers and records every
//! submission as a job with one detail row per item.
//!
//! ## Features
//!
//! - **Single and bulk verification**: one item inline, or a batch from JSON or CSV
//! - **Throttled fan-out**: batches are launched in waves with a pause in between
//! - **Per-item isolation**: one failing provider call never affects its siblings
//! - **Job tracking**: counts, percentages, filtering and pagination per job
//! - **CSV export**: per job or across a date range
//!
//! ## Gateway Mode
//!
//! ```rust,no_run
//! use verification_gateway::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     let gateway = Gateway::new(config).await?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{GatewayError, Result};

pub use core::jobs::{
    BatchAcknowledgement, DetailStatus, Job, JobDetail, JobManager, JobStatus, JobStore,
    RequestContext, Role, SingleVerification, VerificationService,
};
pub use core::providers::{
    ProductType, ProviderError, ProviderRegistry, VerificationProvider, VerificationResult,
};
pub use storage::{InMemoryJobStore, SeaOrmJobStore};

use tracing::info;

/// The assembled gateway: configuration plus a ready-to-start HTTP server
pub struct Gateway {
    config: Config,
    server: server::HttpServer,
}

impl Gateway {
    /// Create a new gateway instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating new gateway instance");

        let server = server::HttpServer::new(&config).await?;

        Ok(Self { config, server })
    }

    /// Shared application state, for embedding the pipeline without HTTP
    pub fn state(&self) -> &server::AppState {
        self.server.state()
    }

    /// Run the gateway server
    pub async fn run(self) -> Result<()> {
        info!(
            address = %self.config.server().address(),
            providers = self.config.providers().len(),
            "Starting verification gateway"
        );

        self.server.start().await
    }
}

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Gateway build information
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Unix timestamp of the build
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
        }
    }
}

/// Build metadata captured by the build script
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
