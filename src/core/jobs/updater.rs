//! Result classification and the terminal detail write

use super::store::JobStore;
use super::types::{DetailStatus, DetailUpdate};
use crate::core::providers::{ProviderError, VerificationProvider, VerificationResult};
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const UNSUCCESSFUL_MESSAGE: &str = "provider reported an unsuccessful verification";

/// Turns provider outcomes into `DetailUpdate`s and persists them
#[derive(Clone)]
pub struct ResultUpdater {
    store: Arc<dyn JobStore>,
}

impl ResultUpdater {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Classify a provider outcome
    ///
    /// * `Err` -> `error` with the transport/provider message
    /// * a known business-failure code in `data.errors` -> `fail`
    /// * `success: false` without such a code -> `error`
    /// * anything else -> `success`
    pub fn classify(
        provider: &dyn VerificationProvider,
        outcome: &std::result::Result<VerificationResult, ProviderError>,
    ) -> DetailUpdate {
        let result = match outcome {
            Ok(result) => result,
            Err(err) => return DetailUpdate::error(err.to_string()),
        };

        let errors = result.errors();
        let describe = |entry: &crate::core::providers::ProviderErrorEntry| {
            if entry.description.is_empty() {
                entry.code.clone()
            } else {
                entry.description.clone()
            }
        };
        let business: Vec<String> = errors
            .iter()
            .filter(|entry| provider.is_business_failure(&entry.code))
            .map(describe)
            .collect();

        let (status, message) = if !business.is_empty() {
            (DetailStatus::Fail, Some(business.join("; ")))
        } else if !result.success {
            let message = result
                .message
                .clone()
                .filter(|m| !m.is_empty())
                .or_else(|| {
                    (!errors.is_empty())
                        .then(|| errors.iter().map(describe).collect::<Vec<_>>().join("; "))
                })
                .unwrap_or_else(|| UNSUCCESSFUL_MESSAGE.to_string());
            (DetailStatus::Error, Some(message))
        } else if !errors.is_empty() {
            let message = errors.iter().map(describe).collect::<Vec<_>>().join("; ");
            (DetailStatus::Success, Some(message))
        } else {
            (DetailStatus::Success, result.message.clone())
        };

        let (primary_status, secondary_status) = result
            .data_field(provider.status_field())
            .map(|raw| split_composite_status(&raw))
            .unwrap_or_default();

        DetailUpdate {
            status,
            message,
            primary_status,
            secondary_status,
            pricing_strategy: result.pricing_strategy.clone(),
            transaction_id: result.transaction_id.clone(),
            provider_datetime: result.datetime.clone(),
            raw_data: (!result.data.is_null()).then(|| result.data.clone()),
        }
    }

    /// Persist the terminal write for one detail
    pub async fn record(&self, detail_id: Uuid, update: &DetailUpdate) -> Result<()> {
        debug!(detail_id = %detail_id, status = %update.status, "Recording detail outcome");
        self.store.complete_detail(detail_id, update).await
    }

    /// Classify then persist; returns what was written
    pub async fn record_outcome(
        &self,
        detail_id: Uuid,
        provider: &dyn VerificationProvider,
        outcome: &std::result::Result<VerificationResult, ProviderError>,
    ) -> Result<DetailUpdate> {
        let update = Self::classify(provider, outcome);
        self.record(detail_id, &update).await?;
        Ok(update)
    }
}

/// Split `"active, reachable"` into `("active", "reachable")`
///
/// Everything after the first comma becomes the secondary status.
pub fn split_composite_status(raw: &str) -> (Option<String>, Option<String>) {
    let mut parts = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty());

    let primary = parts.next().map(str::to_string);
    let rest: Vec<&str> = parts.collect();
    let secondary = (!rest.is_empty()).then(|| rest.join(", "));

    (primary, secondary)
}
