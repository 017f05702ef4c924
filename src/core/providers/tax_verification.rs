//! Tax verification vertical
//!
//! Posts `{"nik": ...}` to `/v1/tax/verification`; the classification lives in `data.status`.

use async_trait::async_trait;
use serde_json::json;

use super::{
    ProductType, ProviderError, ProviderHttpClient, VerificationProvider, VerificationResult,
};
use crate::config::ProviderConfig;
use crate::core::validation::ItemKind;

const ENDPOINT: &str = "/v1/tax/verification";

/// Business-failure codes used when the config does not override them
pub const DEFAULT_BUSINESS_ERROR_CODES: &[&str] = &["NIK_NOT_FOUND", "NIK_MISMATCH"];

#[derive(Debug, Clone)]
pub struct TaxVerificationProvider {
    client: ProviderHttpClient,
    business_error_codes: Vec<String>,
}

impl TaxVerificationProvider {
    pub const NAME: &'static str = "tax-verification";

    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: ProviderHttpClient::new(Self::NAME, config)?,
            business_error_codes: config.business_error_codes_or(DEFAULT_BUSINESS_ERROR_CODES),
        })
    }
}

#[async_trait]
impl VerificationProvider for TaxVerificationProvider {
    fn product(&self) -> ProductType {
        ProductType::TaxVerification
    }

    fn item_kind(&self) -> ItemKind {
        ItemKind::NationalId
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
            .post(ENDPOINT, api_key, json!({ "nik": item }))
            .await
    }
}
