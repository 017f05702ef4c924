//! Submission flow: create, dispatch, finalize

use super::dispatcher::Dispatcher;
use super::manager::JobManager;
use super::types::{Job, JobDetail, JobStatus, RequestContext};
use crate::core::providers::{ProductType, ProviderRegistry, RegisteredProvider};
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Result of a single-item submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleVerification {
    pub job: Job,
    pub detail: JobDetail,
}

/// Acknowledgement of a batch submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAcknowledgement {
    pub job_id: Uuid,
    pub product: ProductType,
    pub total: u64,
    pub status: JobStatus,
}

/// Ties the provider registry, job manager and dispatcher together
pub struct VerificationService {
    registry: Arc<ProviderRegistry>,
    manager: Arc<JobManager>,
    dispatcher: Dispatcher,
}

impl VerificationService {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        manager: Arc<JobManager>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            registry,
            manager,
            dispatcher,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn manager(&self) -> &Arc<JobManager> {
        &self.manager
    }

    /// Verify one item and return its classified detail
    pub async fn submit_single(
        &self,
        ctx: &RequestContext,
        product: ProductType,
        item: String,
    ) -> Result<SingleVerification> {
        let job = self.run(ctx, product, vec![item]).await?;

        let detail = self
            .manager
            .load_details(job.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::internal(format!("job {} has no details", job.id)))?;

        Ok(SingleVerification { job, detail })
    }

    /// Verify a batch; returns once every item has been processed
    pub async fn submit_batch(
        &self,
        ctx: &RequestContext,
        product: ProductType,
        items: Vec<String>,
    ) -> Result<BatchAcknowledgement> {
        let job = self.run(ctx, product, items).await?;

        Ok(BatchAcknowledgement {
            job_id: job.id,
            product: job.product,
            total: job.total,
            status: job.status,
        })
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        product: ProductType,
        items: Vec<String>,
    ) -> Result<Job> {
        let provider = self.provider(product)?;
        let job = self.manager.create_job(ctx, product, items).await?;

        let details = match self.manager.load_details(job.id).await {
            Ok(details) => details,
            Err(err) => {
                error!(job_id = %job.id, "Failed to load job details: {}", err);
                if let Err(finalize_err) = self.manager.finalize_failed_job(job.id).await {
                    error!(job_id = %job.id, "Failed to close job: {}", finalize_err);
                }
                return Err(err);
            }
        };

        // Dispatch and finalize outlive the caller: dropping this future detaches them.
        let manager = self.manager.clone();
        let dispatcher = self.dispatcher.clone();
        let job_id = job.id;
        let job = tokio::spawn(async move {
            dispatcher.dispatch(job_id, &provider, details).await;
            manager.finalize_job(job_id).await
        })
        .await
        .map_err(|err| GatewayError::internal(format!("job {} did not finish: {}", job_id, err)))??;

        info!(
            job_id = %job.id,
            product = %product,
            total = job.total,
            success = job.success_count,
            "Job completed"
        );
        Ok(job)
    }

    fn provider(&self, product: ProductType) -> Result<RegisteredProvider> {
        self.registry
            .get(product)
            .cloned()
            .ok_or_else(|| {
                GatewayError::not_found(format!("no provider configured for {}", product))
            })
    }
}
