//! Configuration loading and the `run_server` entry point

use crate::config::Config;
use crate::server::server::HttpServer;
use crate::utils::error::Result;
use std::path::Path;
use tracing::{info, warn};

/// Load configuration from `path`, falling back to environment variables when the
/// file does not exist
///
/// A file that exists but fails to parse or validate is an error.
pub async fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();

    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        info!("Loading configuration file: {}", path.display());
        return Config::from_file(path).await;
    }

    warn!(
        "Configuration file {} not found, loading from environment",
        path.display()
    );
    Config::from_env()
}

/// Build the server for `config` and run it until shutdown
pub async fn run_server(config: Config) -> Result<()> {
    info!("Starting verification gateway v{}", env!("CARGO_PKG_VERSION"));

    let server = HttpServer::new(&config).await?;
    info!("Server starting at: http://{}", config.server().address());
    info!("API Endpoints:");
    info!("   GET  /health - Health check");
    info!("   POST /v1/verifications/{{product}} - Verify one item");
    info!("   POST /v1/verifications/{{product}}/batch - Verify a batch (JSON or CSV)");
    info!("   GET  /v1/jobs - List jobs");
    info!("   GET  /v1/jobs/summary - Outcome summary");
    info!("   GET  /v1/jobs/export - Export details in a date range");
    info!("   GET  /v1/jobs/{{id}}/details - Job details");
    info!("   GET  /v1/jobs/{{id}}/export - Export one job");

    server.start().await
}
