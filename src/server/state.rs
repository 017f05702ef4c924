//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::jobs::{
    Dispatcher, ErrorSink, Exporter, JobManager, JobStore, VerificationService,
    sink::DEFAULT_SINK_BUFFER,
};
use crate::core::providers::ProviderRegistry;
use crate::utils::error::Result;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// All fields are wrapped in Arc so cloning per worker is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Submission flow
    pub service: Arc<VerificationService>,
    /// Job queries
    pub manager: Arc<JobManager>,
    /// CSV export
    pub exporter: Arc<Exporter>,
}

impl AppState {
    /// Wire the pipeline from already-built parts
    pub fn new(
        config: Config,
        store: Arc<dyn JobStore>,
        registry: ProviderRegistry,
        sink: ErrorSink,
    ) -> Self {
        let manager = Arc::new(JobManager::new(store.clone()));
        let dispatcher = Dispatcher::new(store.clone(), sink, config.dispatch());
        let service = VerificationService::new(Arc::new(registry), manager.clone(), dispatcher);

        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            manager,
            exporter: Arc::new(Exporter::new(store)),
        }
    }

    /// Build store, providers and error sink from configuration
    pub async fn from_config(config: Config) -> Result<Self> {
        let store = crate::storage::build_store(config.storage()).await?;
        let registry = ProviderRegistry::from_configs(config.providers())?;
        let sink = ErrorSink::spawn(DEFAULT_SINK_BUFFER);
        Ok(Self::new(config, store, registry, sink))
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
