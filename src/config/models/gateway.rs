//! Main gateway configuration

use super::*;
use crate::core::providers::ProductType;
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use tracing::debug;

/// Main gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Dispatcher throttle and timeouts
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Provider configurations
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment variables");

        let mut config = Self::default();

        if let Ok(host) = env::var("GATEWAY_HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_var("GATEWAY_PORT")? {
            config.server.port = port;
        }
        if let Some(workers) = parse_var("GATEWAY_WORKERS")? {
            config.server.workers = Some(workers);
        }

        if let Ok(url) = env::var("DATABASE_URL") {
            config.storage.database.url = url;
            config.storage.database.enabled = true;
        }
        if let Some(max_connections) = parse_var("DATABASE_MAX_CONNECTIONS")? {
            config.storage.database.max_connections = max_connections;
        }

        if let Some(batch_size) = parse_var("DISPATCH_BATCH_SIZE")? {
            config.dispatch.batch_size = batch_size;
        }
        if let Some(pause_ms) = parse_var("DISPATCH_PAUSE_MS")? {
            config.dispatch.pause_ms = pause_ms;
        }
        if let Some(timeout) = parse_var("PROVIDER_TIMEOUT_SECS")? {
            config.dispatch.call_timeout_secs = timeout;
        }

        config.providers = load_providers_from_env(config.dispatch.call_timeout_secs);

        debug!(
            providers = config.providers.len(),
            "Configuration loaded from environment variables"
        );
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.server.validate()?;
        self.storage.database.validate()?;
        self.dispatch.validate()?;

        let mut products = HashSet::new();
        for provider in &self.providers {
            if !products.insert(provider.product) {
                return Err(format!("Duplicate provider: {}", provider.product));
            }
            if provider.api_key.is_empty() {
                return Err(format!(
                    "API key is required for provider: {}",
                    provider.product
                ));
            }
            provider.validate()?;
        }

        Ok(())
    }
}

/// `<PRODUCT>_API_KEY` and `<PRODUCT>_API_BASE` for every vertical that has both
fn load_providers_from_env(timeout_secs: u64) -> Vec<ProviderConfig> {
    ProductType::ALL
        .iter()
        .filter_map(|product| {
            let prefix = product.env_prefix();
            let api_key = env::var(format!("{}_API_KEY", prefix)).ok()?;
            let api_base = env::var(format!("{}_API_BASE", prefix)).ok()?;
            let mut config = ProviderConfig::new(*product, api_key, api_base);
            config.timeout_secs = timeout_secs;
            Some(config)
        })
        .collect()
}

fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| GatewayError::Config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}
