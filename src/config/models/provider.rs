//! Provider configuration

use super::*;
use crate::core::providers::ProductType;
use serde::{Deserialize, Serialize};

/// Settings for one product vertical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Vertical served by this entry
    pub product: ProductType,
    /// API key sent in the `X-API-KEY` header
    pub api_key: String,
    /// Provider base URL
    pub api_base: String,
    /// HTTP client timeout in seconds
    #[serde(default = "default_call_timeout_secs")]
    pub timeout_secs: u64,
    /// Overrides the vertical's built-in business-failure codes
    #[serde(default)]
    pub business_error_codes: Option<Vec<String>>,
}

impl ProviderConfig {
    pub fn new(
        product: ProductType,
        api_key: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            product,
            api_key: api_key.into(),
            api_base: api_base.into(),
            timeout_secs: default_call_timeout_secs(),
            business_error_codes: None,
        }
    }

    /// Configured codes, or the vertical's defaults
    pub fn business_error_codes_or(&self, defaults: &[&str]) -> Vec<String> {
        match &self.business_error_codes {
            Some(codes) => codes.clone(),
            None => defaults.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_base.is_empty() {
            return Err(format!("API base is required for provider: {}", self.product));
        }
        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(format!(
                "API base for provider {} must be an http(s) URL",
                self.product
            ));
        }
        if self.timeout_secs == 0 {
            return Err(format!("Timeout cannot be 0 for provider: {}", self.product));
        }
        Ok(())
    }
}
