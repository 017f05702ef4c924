//! Multiple loan vertical
//!
//! Posts `{"phone_number": ...}` to `/v1/loan/multiple-loan`; the classification lives in `data.remarks`.

use async_trait::async_trait;
use serde_json::json;

use super::{
    ProductType, ProviderError, ProviderHttpClient, VerificationProvider, VerificationResult,
};
use crate::config::ProviderConfig;
use crate::core::validation::ItemKind;

const ENDPOINT: &str = "/v1/loan/multiple-loan";

/// Business-failure codes used when the config does not override them
pub const DEFAULT_BUSINESS_ERROR_CODES: &[&str] = &["PHONE_NOT_REGISTERED"];

/// Counts active loans registered against a phone number
#[derive(Debug, Clone)]
pub struct MultipleLoanProvider {
    client: ProviderHttpClient,
    business_error_codes: Vec<String>,
}

impl MultipleLoanProvider {
    pub const NAME: &'static str = "multiple-loan";

    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: ProviderHttpClient::new(Self::NAME, config)?,
            business_error_codes: config.business_error_codes_or(DEFAULT_BUSINESS_ERROR_CODES),
        })
    }
}

#[async_trait]
impl VerificationProvider for MultipleLoanProvider {
    fn product(&self) -> ProductType {
        ProductType::MultipleLoan
    }

    fn item_kind(&self) -> ItemKind {
        ItemKind::PhoneNumber
    }

    fn status_field(&self) -> &'static str {
        "remarks"
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
