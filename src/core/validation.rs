//! Structural validation of submitted identifiers
//!
//! Items are checked before any provider call. A failing item is recorded as an `error`
//! detail and never reaches the provider.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Indonesian mobile number: `08..`, `628..` or `+628..`
static PHONE_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^(?:\+?62|0)8[1-9][0-9]{6,10}$")
        .map_err(|e| tracing::error!("Failed to compile phone regex: {}", e))
        .ok()
});

/// Kind of identifier a vertical accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Mobile phone number
    PhoneNumber,
    /// Tax identification number (NPWP), 15 or 16 digits
    TaxId,
    /// National identity number (NIK), 16 digits
    NationalId,
}

/// Why an item was rejected before dispatch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemValidationError {
    #[error("item is empty")]
    Empty,
    #[error("invalid phone number format: {0}")]
    PhoneNumber(String),
    #[error("invalid tax id: expected 15 or 16 digits, got {0}")]
    TaxId(String),
    #[error("invalid national id: expected 16 digits, got {0}")]
    NationalId(String),
}

impl ItemKind {
    /// Validate and normalize a raw item
    pub fn validate(&self, raw: &str) -> Result<String, ItemValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ItemValidationError::Empty);
        }

        match self {
            ItemKind::PhoneNumber => {
                let normalized: String = trimmed
                    .chars()
                    .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
                    .collect();
                if PHONE_PATTERN
                    .as_ref()
                    .is_some_and(|re| re.is_match(&normalized))
                {
                    Ok(normalized)
                } else {
                    Err(ItemValidationError::PhoneNumber(trimmed.to_string()))
                }
            }
            ItemKind::TaxId => {
                let normalized: String = trimmed
                    .chars()
                    .filter(|c| !matches!(c, '.' | '-' | ' '))
                    .collect();
                let digits_only = normalized.chars().all(|c| c.is_ascii_digit());
                if digits_only && matches!(normalized.len(), 15 | 16) {
                    Ok(normalized)
                } else {
                    Err(ItemValidationError::TaxId(trimmed.to_string()))
                }
            }
            ItemKind::NationalId => {
                if trimmed.len() == 16 && trimmed.chars().all(|c| c.is_ascii_digit()) {
                    Ok(trimmed.to_string())
                } else {
                    Err(ItemValidationError::NationalId(trimmed.to_string()))
                }
            }
        }
    }
}
