//! Scripted provider
//!
//! Answers per item from a script, falling back to a default reply, and counts every
//! call so tests can assert which items reached the provider.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use verification_gateway::core::providers::{
    ProductType, ProviderError, VerificationProvider, VerificationResult,
};
use verification_gateway::core::validation::ItemKind;

/// How the provider answers one item
#[derive(Debug, Clone)]
pub enum Reply {
    /// `success: true` with this value in the status field
    Status(&'static str),
    /// `success: true` carrying a business error code
    Business(&'static str),
    /// `success: false` with this message
    Unsuccessful(&'static str),
    /// Connection-level failure
    Transport,
}

pub struct ScriptedProvider {
    product: ProductType,
    item_kind: ItemKind,
    status_field: &'static str,
    business_codes: Vec<&'static str>,
    default_reply: Reply,
    script: HashMap<String, Reply>,
    latency: Duration,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Phone vertical whose status field is the composite `live_status`
    pub fn live_status(default_reply: Reply) -> Self {
        Self {
            product: ProductType::LiveStatus,
            item_kind: ItemKind::PhoneNumber,
            status_field: "live_status",
            business_codes: vec!["PHONE_NOT_ACTIVE", "PHONE_UNREACHABLE"],
            default_reply,
            script: HashMap::new(),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Override the reply for one item
    pub fn with_reply(mut self, item: &str, reply: Reply) -> Self {
        self.script.insert(item.to_string(), reply);
        self
    }

    /// Delay every reply by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Items received so far, in call order
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }

    fn status_data(&self, status: &str) -> Value {
        let mut data = Map::new();
        data.insert(self.status_field.to_string(), Value::from(status));
        Value::Object(data)
    }
}

#[async_trait]
impl VerificationProvider for ScriptedProvider {
    fn product(&self) -> ProductType {
        self.product
    }

    fn item_kind(&self) -> ItemKind {
        self.item_kind
    }

    fn status_field(&self) -> &'static str {
        self.status_field
    }

    fn is_business_failure(&self, code: &str) -> bool {
        self.business_codes.contains(&code)
    }

    async fn verify_item(
        &self,
        _api_key: &str,
        item: &str,
    ) -> Result<VerificationResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(item.to_string());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.script.get(item).unwrap_or(&self.default_reply) {
            Reply::Status(status) => Ok(VerificationResult {
                success: true,
                data: self.status_data(status),
                pricing_strategy: Some("PAY".to_string()),
                transaction_id: Some(format!("TX-{}", item)),
                datetime: Some("2024-05-01 09:00:00".to_string()),
                message: Some("Success".to_string()),
            }),
            Reply::Business(code) => Ok(VerificationResult {
                success: true,
                data: json!({"errors": [{"code": code, "description": "rejected by provider"}]}),
                ..Default::default()
            }),
            Reply::Unsuccessful(message) => Ok(VerificationResult {
                success: false,
                message: Some(message.to_string()),
                ..Default::default()
            }),
            Reply::Transport => Err(ProviderError::network("live-status", "connection refused")),
        }
    }
}
