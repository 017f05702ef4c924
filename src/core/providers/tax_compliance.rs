//! Tax compliance vertical
//!
//! Posts `{"npwp": ...}` to `/v1/tax/compliance`; the classification lives in `data.status`.

use async_trait::async_trait;
use serde_json::json;

use super::{
    ProductType, ProviderError, ProviderHttpClient, VerificationProvider, VerificationResult,
};
use crate::config::ProviderConfig;
use crate::core::validation::ItemKind;

const ENDPOINT: &str = "/v1/tax/compliance";

/// Business-failure codes used when the config does not override them
pub const DEFAULT_BUSINESS_ERROR_CODES: &[&str] = &["NPWP_NOT_FOUND", "NPWP_INACTIVE"];

#[derive(Debug, Clone)]
pub struct TaxComplianceProvider {
    client: ProviderHttpClient,
    business_error_codes: Vec<String>,
}

impl TaxComplianceProvider {
    pub const NAME: &'static str = "tax-compliance";

    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: ProviderHttpClient::new(Self::NAME, config)?,
            business_error_codes: config.business_error_codes_or(DEFAULT_BUSINESS_ERROR_CODES),
        })
    }
}

#[async_trait]
impl VerificationProvider for TaxComplianceProvider {
    fn product(&self) -> ProductType {
        ProductType::TaxCompliance
    }

    fn item_kind(&self) -> ItemKind {
        ItemKind::TaxId
    }

    fn status_field(&self) -> &'static str {
        "status"
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
            .post(ENDPOINT, api_key, json!({ "npwp": item }))
            .await
    }
}
