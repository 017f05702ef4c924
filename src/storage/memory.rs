//! In-memory job store
//!
//! Used when no database is configured and throughout the test suite.

use crate::core::jobs::store::JobStore;
use crate::core::jobs::types::{
    DateRange, DetailQuery, DetailUpdate, Job, JobDetail, JobQuery, JobStatus, StatusCounts,
    Visibility,
};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    jobs: HashMap<Uuid, Job>,
    details: HashMap<Uuid, JobDetail>,
}

impl Tables {
    fn visible_job_ids(&self, visibility: &Visibility, range: &DateRange) -> Vec<Uuid> {
        self.jobs
            .values()
            .filter(|job| visibility.allows(job) && range.contains(job.created_at))
            .map(|job| job.id)
            .collect()
    }

    fn details_of(&self, job_id: Uuid) -> Vec<JobDetail> {
        let mut details: Vec<JobDetail> = self
            .details
            .values()
            .filter(|detail| detail.job_id == job_id)
            .cloned()
            .collect();
        details.sort_by_key(|detail| detail.sequence);
        details
    }
}

/// `JobStore` backed by two hash maps behind one lock
#[derive(Default)]
pub struct InMemoryJobStore {
    tables: RwLock<Tables>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored jobs
    pub fn job_count(&self) -> usize {
        self.tables.read().jobs.len()
    }

    /// Number of stored details across all jobs
    pub fn detail_count(&self) -> usize {
        self.tables.read().details.len()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create_job(&self, job: &Job, details: &[JobDetail]) -> Result<()> {
        let mut tables = self.tables.write();

        if tables.jobs.contains_key(&job.id) {
            return Err(GatewayError::persistence(format!(
                "job {} already exists",
                job.id
            )));
        }
        if let Some(detail) = details
            .iter()
            .find(|detail| tables.details.contains_key(&detail.id))
        {
            return Err(GatewayError::persistence(format!(
                "job detail {} already exists",
                detail.id
            )));
        }

        tables.jobs.insert(job.id, job.clone());
        for detail in details {
            tables.details.insert(detail.id, detail.clone());
        }
        Ok(())
    }

    async fn find_job(&self, job_id: Uuid) -> Result<Option<Job>> {
        Ok(self.tables.read().jobs.get(&job_id).cloned())
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<(Vec<Job>, u64)> {
        let tables = self.tables.read();
        let mut jobs: Vec<Job> = tables
            .jobs
            .values()
            .filter(|job| {
                query.visibility.allows(job)
                    && query.range.contains(job.created_at)
                    && query.product.is_none_or(|product| job.product == product)
            })
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = jobs.len() as u64;
        let page = jobs
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_detail(&self, detail_id: Uuid) -> Result<Option<JobDetail>> {
        Ok(self.tables.read().details.get(&detail_id).cloned())
    }

    async fn list_details(
        &self,
        job_id: Uuid,
        query: &DetailQuery,
    ) -> Result<(Vec<JobDetail>, u64)> {
        let matching: Vec<JobDetail> = self
            .tables
            .read()
            .details_of(job_id)
            .into_iter()
            .filter(|detail| query.matches(detail))
            .collect();

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn details_for_job(&self, job_id: Uuid) -> Result<Vec<JobDetail>> {
        Ok(self.tables.read().details_of(job_id))
    }

    async fn details_in_range(
        &self,
        visibility: &Visibility,
        range: &DateRange,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<JobDetail>> {
        let tables = self.tables.read();
        let mut jobs: Vec<&Job> = tables
            .visible_job_ids(visibility, range)
            .iter()
            .filter_map(|id| tables.jobs.get(id))
            .collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(jobs
            .into_iter()
            .flat_map(|job| tables.details_of(job.id))
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_details(&self, job_id: Uuid) -> Result<StatusCounts> {
        Ok(self
            .tables
            .read()
            .details
            .values()
            .filter(|detail| detail.job_id == job_id)
            .map(|detail| detail.status)
            .collect())
    }

    async fn count_details_in_range(
        &self,
        visibility: &Visibility,
        range: &DateRange,
    ) -> Result<StatusCounts> {
        let tables = self.tables.read();
        let job_ids = tables.visible_job_ids(visibility, range);
        Ok(tables
            .details
            .values()
            .filter(|detail| job_ids.contains(&detail.job_id))
            .map(|detail| detail.status)
            .collect())
    }

    async fn count_jobs(&self, visibility: &Visibility, range: &DateRange) -> Result<u64> {
        Ok(self.tables.read().visible_job_ids(visibility, range).len() as u64)
    }

    async fn mark_detail_in_progress(&self, detail_id: Uuid) -> Result<()> {
        let mut tables = self.tables.write();
        let detail = tables
            .details
            .get_mut(&detail_id)
            .ok_or_else(|| GatewayError::not_found(format!("job detail {}", detail_id)))?;
        detail.in_progress = true;
        Ok(())
    }

    async fn complete_detail(&self, detail_id: Uuid, update: &DetailUpdate) -> Result<()> {
        let mut tables = self.tables.write();
        let detail = tables
            .details
            .get_mut(&detail_id)
            .ok_or_else(|| GatewayError::not_found(format!("job detail {}", detail_id)))?;
        detail.apply(update);
        Ok(())
    }

    async fn finalize_job(
        &self,
        job_id: Uuid,
        status: JobStatus,
        success_count: u64,
        end_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tables = self.tables.write();
        let job = tables
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| GatewayError::not_found(format!("job {}", job_id)))?;
        job.status = status;
        job.success_count = success_count;
        job.end_at = Some(end_at);
        Ok(())
    }
}
