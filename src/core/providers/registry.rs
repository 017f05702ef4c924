//! Provider Registry
//!
//! Centralized registry mapping each product vertical to its adapter and API key

use super::{
    ProductType, ProviderError, VerificationProvider, live_status::LiveStatusProvider,
    loan_record::LoanRecordCheckerProvider, multiple_loan::MultipleLoanProvider,
    tax_compliance::TaxComplianceProvider, tax_score::TaxScoreProvider,
    tax_verification::TaxVerificationProvider,
};
use crate::config::ProviderConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Adapter plus the API key it is called with
#[derive(Clone)]
pub struct RegisteredProvider {
    pub provider: Arc<dyn VerificationProvider>,
    pub api_key: Arc<str>,
}

/// Provider Registry keyed by product
pub struct ProviderRegistry {
    providers: HashMap<ProductType, RegisteredProvider>,
}

impl ProviderRegistry {
    /// Create new provider registry
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Build every configured vertical
    pub fn from_configs(configs: &[ProviderConfig]) -> Result<Self, ProviderError> {
        let mut registry = Self::new();
        for config in configs {
            let provider = build_provider(config)?;
            registry.register(provider, config.api_key.as_str());
            info!(product = %config.product, api_base = %config.api_base, "Registered provider");
        }
        Ok(registry)
    }

    /// Register a provider under its own product
    pub fn register(
        &mut self,
        provider: Arc<dyn VerificationProvider>,
        api_key: impl Into<Arc<str>>,
    ) {
        let product = provider.product();
        self.providers.insert(
            product,
            RegisteredProvider {
                provider,
                api_key: api_key.into(),
            },
        );
    }

    /// Get provider by product
    pub fn get(&self, product: ProductType) -> Option<&RegisteredProvider> {
        self.providers.get(&product)
    }

    /// Products with a registered adapter
    pub fn products(&self) -> Vec<ProductType> {
        let mut products: Vec<_> = self.providers.keys().copied().collect();
        products.sort_by_key(|p| p.as_str());
        products
    }

    /// Check if a product is registered
    pub fn contains(&self, product: ProductType) -> bool {
        self.providers.contains_key(&product)
    }

    /// Get provider count
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("provider_count", &self.providers.len())
            .field("products", &self.products())
            .finish()
    }
}

/// Construct the adapter for a configured vertical
pub fn build_provider(
    config: &ProviderConfig,
) -> Result<Arc<dyn VerificationProvider>, ProviderError> {
    let provider: Arc<dyn VerificationProvider> = match config.product {
        ProductType::LiveStatus => Arc::new(LiveStatusProvider::new(config)?),
        ProductType::LoanRecordChecker => Arc::new(LoanRecordCheckerProvider::new(config)?),
        ProductType::MultipleLoan => Arc::new(MultipleLoanProvider::new(config)?),
        ProductType::TaxCompliance => Arc::new(TaxComplianceProvider::new(config)?),
        ProductType::TaxScore => Arc::new(TaxScoreProvider::new(config)?),
        ProductType::TaxVerification => Arc::new(TaxVerificationProvider::new(config)?),
    };
    Ok(provider)
}
