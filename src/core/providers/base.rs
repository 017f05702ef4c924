//! Shared HTTP plumbing for verification adapters
//!
//! Every vertical posts a small JSON body with an `X-API-KEY` header and receives the same
//! envelope back, so the request, status mapping and parsing live here once.

use super::{ProviderError, VerificationResult};
use crate::config::ProviderConfig;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Header carrying the caller's provider API key
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// HTTP client bound to one provider base URL
#[derive(Debug, Clone)]
pub struct ProviderHttpClient {
    name: &'static str,
    api_base: String,
    http: reqwest::Client,
}

impl ProviderHttpClient {
    /// Build a client from provider settings
    pub fn new(name: &'static str, config: &ProviderConfig) -> Result<Self, ProviderError> {
        config
            .validate()
            .map_err(|e| ProviderError::configuration(name, e))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::configuration(name, e.to_string()))?;

        Ok(Self {
            name,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL requests are sent to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// POST `body` to `path` and parse the provider envelope
    pub async fn post(
        &self,
        path: &str,
        api_key: &str,
        body: Value,
    ) -> Result<VerificationResult, ProviderError> {
        let url = format!("{}{}", self.api_base, path);
        debug!(provider = self.name, url = %url, "Sending verification request");

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(self.name, e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_reqwest(self.name, e))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            return Err(map_http_error(self.name, status, &body));
        }

        serde_json::from_slice::<VerificationResult>(&bytes)
            .map_err(|e| ProviderError::response_parsing(self.name, e.to_string()))
    }
}

/// Map a non-2xx reply to a structured error
pub fn map_http_error(provider: &'static str, status: StatusCode, body: &str) -> ProviderError {
    let message = extract_message(body).unwrap_or_else(|| body.to_string());
    match status.as_u16() {
        401 => ProviderError::authentication(provider, "Invalid API key"),
        403 => ProviderError::authentication(provider, "Permission denied"),
        429 => ProviderError::rate_limit(provider, None),
        400 | 422 => ProviderError::invalid_request(provider, message),
        code => ProviderError::api_error(provider, code, message),
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
