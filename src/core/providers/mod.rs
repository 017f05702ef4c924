//! Verification providers
//!
//! One `VerificationProvider` capability implemented once per product vertical. The
//! dispatcher and job manager only ever see the trait, so orchestration is written once.

pub mod base;
pub mod error;
pub mod live_status;
pub mod loan_record;
pub mod multiple_loan;
pub mod registry;
pub mod tax_compliance;
pub mod tax_score;
pub mod tax_verification;

pub use base::ProviderHttpClient;
pub use error::ProviderError;
pub use registry::{ProviderRegistry, RegisteredProvider};

use crate::core::validation::ItemKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product vertical identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    LiveStatus,
    LoanRecordChecker,
    MultipleLoan,
    TaxCompliance,
    TaxScore,
    TaxVerification,
}

impl ProductType {
    /// Every supported vertical
    pub const ALL: [ProductType; 6] = [
        ProductType::LiveStatus,
        ProductType::LoanRecordChecker,
        ProductType::MultipleLoan,
        ProductType::TaxCompliance,
        ProductType::TaxScore,
        ProductType::TaxVerification,
    ];

    /// Stable kebab-case identifier used in URLs, config and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::LiveStatus => "live-status",
            ProductType::LoanRecordChecker => "loan-record-checker",
            ProductType::MultipleLoan => "multiple-loan",
            ProductType::TaxCompliance => "tax-compliance",
            ProductType::TaxScore => "tax-score",
            ProductType::TaxVerification => "tax-verification",
        }
    }

    /// Environment variable prefix, e.g. `LIVE_STATUS`
    pub fn env_prefix(&self) -> String {
        self.as_str().replace('-', "_").to_uppercase()
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductType::ALL
            .iter()
            .copied()
            .find(|product| product.as_str() == s)
            .ok_or_else(|| format!("unknown product: {}", s))
    }
}

/// Error entry carried in `data.errors` of a provider envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderErrorEntry {
    pub code: String,
    pub description: String,
}

/// Normalized provider envelope
///
/// Every vertical answers with `{success, data, pricing_strategy, transaction_id, datetime, message}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub pricing_strategy: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl VerificationResult {
    /// Entries of `data.errors`, tolerating numeric codes and missing descriptions
    pub fn errors(&self) -> Vec<ProviderErrorEntry> {
        let Some(entries) = self.data.get("errors").and_then(|e| e.as_array()) else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let code = match entry.get("code")? {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let description = entry
                    .get("description")
                    .and_then(|d| d.as_str())
                    .unwrap_or_default()
                    .to_string();
                Some(ProviderErrorEntry { code, description })
            })
            .collect()
    }

    /// Read a field of `data` as text
    pub fn data_field(&self, field: &str) -> Option<String> {
        match self.data.get(field)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Capability every product vertical implements
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    /// Vertical served by this adapter
    fn product(&self) -> ProductType;

    /// Kind of identifier accepted by the vertical
    fn item_kind(&self) -> ItemKind;

    /// Field of `data` holding the classification string
    fn status_field(&self) -> &'static str;

    /// Whether `code` is a known business-failure code for this vertical
    fn is_business_failure(&self, code: &str) -> bool;

    /// Verify a single item. Transport failures come back as `ProviderError`.
    async fn verify_item(
        &self,
        api_key: &str,
        item: &str,
    ) -> Result<VerificationResult, ProviderError>;
}
