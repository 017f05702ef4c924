//! Persistence seam for jobs and their details

use super::types::{
    DateRange, DetailQuery, DetailUpdate, Job, JobDetail, JobQuery, JobStatus, StatusCounts,
    Visibility,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Storage operations the job pipeline needs
///
/// Implementations must make `create_job` atomic: either the job and all of its
/// details exist afterwards, or none of them do. Every other write touches a
/// single row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a job together with its details
    async fn create_job(&self, job: &Job, details: &[JobDetail]) -> Result<()>;

    async fn find_job(&self, job_id: Uuid) -> Result<Option<Job>>;

    /// Jobs matching the query, newest first, plus the unpaginated count
    async fn list_jobs(&self, query: &JobQuery) -> Result<(Vec<Job>, u64)>;

    async fn find_detail(&self, detail_id: Uuid) -> Result<Option<JobDetail>>;

    /// Details of one job matching the query, by sequence, plus the unpaginated count
    async fn list_details(&self, job_id: Uuid, query: &DetailQuery)
    -> Result<(Vec<JobDetail>, u64)>;

    /// Every detail of one job, by sequence
    async fn details_for_job(&self, job_id: Uuid) -> Result<Vec<JobDetail>>;

    /// One page of the details of every visible job created within the range
    ///
    /// Ordered by job creation time, job id, then sequence, so consecutive pages never
    /// overlap.
    async fn details_in_range(
        &self,
        visibility: &Visibility,
        range: &DateRange,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<JobDetail>>;

    /// Per-status counts for one job
    async fn count_details(&self, job_id: Uuid) -> Result<StatusCounts>;

    /// Per-status counts across every visible job created within the range
    async fn count_details_in_range(
        &self,
        visibility: &Visibility,
        range: &DateRange,
    ) -> Result<StatusCounts>;

    /// Number of visible jobs created within the range
    async fn count_jobs(&self, visibility: &Visibility, range: &DateRange) -> Result<u64>;

    /// Flag a detail as picked up by the dispatcher
    async fn mark_detail_in_progress(&self, detail_id: Uuid) -> Result<()>;

    /// The terminal write for a detail; clears `in_progress`
    async fn complete_detail(&self, detail_id: Uuid, update: &DetailUpdate) -> Result<()>;

    /// Set status, `success_count` and `end_at` on a job
    async fn finalize_job(
        &self,
        job_id: Uuid,
        status: JobStatus,
        success_count: u64,
        end_at: DateTime<Utc>,
    ) -> Result<()>;
}
