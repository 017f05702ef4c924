//! Tax score vertical
//!
//! Posts `{"npwp": ...}` to `/v1/tax/score`; `data.score` is numeric and
//! stored as text.

use async_trait::async_trait;
use serde_json::json;

use super::{
    ProductType, ProviderError, ProviderHttpClient, VerificationProvider, VerificationResult,
};
use crate::config::ProviderConfig;
use crate::core::validation::ItemKind;

const ENDPOINT: &str = "/v1/tax/score";

pub const DEFAULT_BUSINESS_ERROR_CODES: &[&str] = &["NPWP_NOT_FOUND"];

#[derive(Debug, Clone)]
pub struct TaxScoreProvider {
    client: ProviderHttpClient,
    business_error_codes: Vec<String>,
}

impl TaxScoreProvider {
    pub const NAME: &'static str = "tax-score";

    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: ProviderHttpClient::new(Self::NAME, config)?,
            business_error_codes: config.business_error_codes_or(DEFAULT_BUSINESS_ERROR_CODES),
        })
    }
}

#[async_trait]
impl VerificationProvider for TaxScoreProvider {
    fn product(&self) -> ProductType {
        ProductType::TaxScore
    }

    fn item_kind(&self) -> ItemKind {
        ItemKind::TaxId
    }

    fn status_field(&self) -> &'static str {
        "score"
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
