//! Phone live-status vertical
//!
//! Posts `{"phone_number": ...}` to `/v1/phone/live-status`. `data.live_status` is a
//! composite such as `"active, reachable"`: line state first, reachability second.

use async_trait::async_trait;
use serde_json::json;

use super::{
    ProductType, ProviderError, ProviderHttpClient, VerificationProvider, VerificationResult,
};
use crate::config::ProviderConfig;
use crate::core::validation::ItemKind;

const ENDPOINT: &str = "/v1/phone/live-status";

/// Business-failure codes used when the config does not override them
pub const DEFAULT_BUSINESS_ERROR_CODES: &[&str] = &["PHONE_NOT_ACTIVE", "PHONE_UNREACHABLE"];

#[derive(Debug, Clone)]
pub struct LiveStatusProvider {
    client: ProviderHttpClient,
    business_error_codes: Vec<String>,
}

impl LiveStatusProvider {
    pub const NAME: &'static str = "live-status";

    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: ProviderHttpClient::new(Self::NAME, config)?,
            business_error_codes: config.business_error_codes_or(DEFAULT_BUSINESS_ERROR_CODES),
        })
    }
}

#[async_trait]
impl VerificationProvider for LiveStatusProvider {
    fn product(&self) -> ProductType {
        ProductType::LiveStatus
    }

    fn item_kind(&self) -> ItemKind {
        ItemKind::PhoneNumber
    }

    fn status_field(&self) -> &'static str {
        "live_status"
    }

    fn is_business_failure(&self, code: &str) -> bool {
        self.business_error_codes.iter().any(|known| known == code)
    }

    async fn verify_item(
        &self,
        api_key: &str,
        item: &str,
    ) -> Result<VerificationResult, ProviderError> {
        self.client
            .post(ENDPOINT, api_key, json!({ "phone_number": item }))
            .await
    }
}
