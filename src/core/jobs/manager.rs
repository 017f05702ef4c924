//! Job creation, queries and finalization

use super::store::JobStore;
use super::types::{
    DateRange, DetailQuery, DetailStatus, Job, JobDetail, JobQuery, JobStatus,
    OutcomePercentages, Page, PageRequest, RequestContext, StatusCounts,
};
use crate::core::providers::ProductType;
use crate::utils::error::{GatewayError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Filter for listing jobs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub range: DateRange,
    pub product: Option<ProductType>,
    pub page: PageRequest,
}

/// Filter for listing the details of one job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailFilter {
    pub keyword: Option<String>,
    pub status: Option<DetailStatus>,
    pub page: PageRequest,
}

/// One page of details plus the job-wide outcome split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetailsPage {
    pub job: Job,
    pub details: Page<JobDetail>,
    pub counts: StatusCounts,
    pub percentages: OutcomePercentages,
}

/// Aggregate counts over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsSummary {
    pub range: DateRange,
    pub total_jobs: u64,
    pub total_items: u64,
    pub counts: StatusCounts,
    pub percentages: OutcomePercentages,
}

/// Owns the Job rows: creates them and finalizes them
pub struct JobManager {
    store: Arc<dyn JobStore>,
}

impl JobManager {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Persist one pending job and one pending detail per item
    ///
    /// Nothing is stored when `items` is empty or the store write fails.
    pub async fn create_job(
        &self,
        ctx: &RequestContext,
        product: ProductType,
        items: Vec<String>,
    ) -> Result<Job> {
        if items.is_empty() {
            return Err(GatewayError::validation("at least one item is required"));
        }

        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            product,
            total: items.len() as u64,
            success_count: 0,
            status: JobStatus::Pending,
            owner_id: ctx.owner_id,
            scope_id: ctx.scope_id,
            created_at: now,
            end_at: None,
        };
        let details: Vec<JobDetail> = items
            .into_iter()
            .enumerate()
            .map(|(sequence, item)| JobDetail::pending(job.id, sequence as u32, item, now))
            .collect();

        self.store.create_job(&job, &details).await?;

        info!(
            job_id = %job.id,
            product = %product,
            total = job.total,
            "Created job"
        );
        Ok(job)
    }

    /// Every detail of a job in submission order
    pub async fn load_details(&self, job_id: Uuid) -> Result<Vec<JobDetail>> {
        self.store.details_for_job(job_id).await
    }

    /// Visible jobs, newest first
    pub async fn get_jobs(&self, ctx: &RequestContext, filter: &JobFilter) -> Result<Page<Job>> {
        filter.page.validate().map_err(GatewayError::BadRequest)?;

        let query = JobQuery {
            visibility: ctx.visibility(),
            range: filter.range,
            product: filter.product,
            offset: filter.page.offset(),
            limit: filter.page.limit,
        };
        let (items, total) = self.store.list_jobs(&query).await?;

        Ok(Page {
            items,
            page: filter.page.page,
            limit: filter.page.limit,
            total,
        })
    }

    /// A single visible job
    pub async fn get_job(&self, ctx: &RequestContext, job_id: Uuid) -> Result<Job> {
        match self.store.find_job(job_id).await? {
            Some(job) if ctx.visibility().allows(&job) => Ok(job),
            _ => Err(GatewayError::not_found(format!("job {}", job_id))),
        }
    }

    /// A page of a visible job's details with success/fail/error percentages
    pub async fn get_job_details(
        &self,
        ctx: &RequestContext,
        job_id: Uuid,
        filter: &DetailFilter,
    ) -> Result<JobDetailsPage> {
        filter.page.validate().map_err(GatewayError::BadRequest)?;
        let job = self.get_job(ctx, job_id).await?;

        let query = DetailQuery {
            keyword: filter.keyword.clone().filter(|k| !k.is_empty()),
            status: filter.status,
            offset: filter.page.offset(),
            limit: filter.page.limit,
        };
        let (items, total) = self.store.list_details(job_id, &query).await?;
        let counts = self.store.count_details(job_id).await?;

        Ok(JobDetailsPage {
            job,
            details: Page {
                items,
                page: filter.page.page,
                limit: filter.page.limit,
                total,
            },
            counts,
            percentages: counts.percentages(),
        })
    }

    /// Aggregate counts over every visible job created within `range`
    pub async fn jobs_summary(&self, ctx: &RequestContext, range: DateRange) -> Result<JobsSummary> {
        let visibility = ctx.visibility();
        let total_jobs = self.store.count_jobs(&visibility, &range).await?;
        let counts = self.store.count_details_in_range(&visibility, &range).await?;

        Ok(JobsSummary {
            range,
            total_jobs,
            total_items: counts.total(),
            counts,
            percentages: counts.percentages(),
        })
    }

    /// Close a job as `done` with `success_count` recomputed from its details
    pub async fn finalize_job(&self, job_id: Uuid) -> Result<Job> {
        self.finalize(job_id, JobStatus::Done).await
    }

    /// Close a job as `failed`; used when the submission broke after creation
    pub async fn finalize_failed_job(&self, job_id: Uuid) -> Result<Job> {
        self.finalize(job_id, JobStatus::Failed).await
    }

    async fn finalize(&self, job_id: Uuid, status: JobStatus) -> Result<Job> {
        let counts = self.store.count_details(job_id).await?;
        self.store
            .finalize_job(job_id, status, counts.success, Utc::now())
            .await?;

        debug!(job_id = %job_id, status = %status, success = counts.success, "Finalized job");

        self.store
            .find_job(job_id)
            .await?
            .ok_or_else(|| GatewayError::not_found(format!("job {}", job_id)))
    }
}
