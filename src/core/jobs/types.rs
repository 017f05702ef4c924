//! Job and JobDetail domain types

use crate::core::providers::ProductType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle of a job: `pending -> {done, failed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "done" => Ok(JobStatus::Done),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}

/// Outcome of one item: `pending -> {success, fail, error}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailStatus {
    #[default]
    Pending,
    /// Provider answered and the item verified
    Success,
    /// Provider answered with a known business-failure code
    Fail,
    /// Invalid item, transport failure or provider-side error
    Error,
}

impl DetailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailStatus::Pending => "pending",
            DetailStatus::Success => "success",
            DetailStatus::Fail => "fail",
            DetailStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DetailStatus::Pending)
    }
}

impl fmt::Display for DetailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DetailStatus::Pending),
            "success" => Ok(DetailStatus::Success),
            "fail" => Ok(DetailStatus::Fail),
            "error" => Ok(DetailStatus::Error),
            other => Err(format!("unknown detail status: {}", other)),
        }
    }
}

/// Caller role; decides which jobs are visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Sees every job in the scope
    Admin,
    /// Sees only the jobs they own
    Member,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Identity of the caller, passed explicitly into every job operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub owner_id: Uuid,
    pub scope_id: Uuid,
    pub role: Role,
}

impl RequestContext {
    pub fn new(owner_id: Uuid, scope_id: Uuid, role: Role) -> Self {
        Self {
            owner_id,
            scope_id,
            role,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self.role {
            Role::Admin => Visibility::Scope(self.scope_id),
            Role::Member => Visibility::Owner {
                owner_id: self.owner_id,
                scope_id: self.scope_id,
            },
        }
    }
}

/// Row filter derived from a `RequestContext`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Scope(Uuid),
    Owner { owner_id: Uuid, scope_id: Uuid },
}

impl Visibility {
    pub fn allows(&self, job: &Job) -> bool {
        match *self {
            Visibility::Scope(scope_id) => job.scope_id == scope_id,
            Visibility::Owner { owner_id, scope_id } => {
                job.owner_id == owner_id && job.scope_id == scope_id
            }
        }
    }
}

/// One submission batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub product: ProductType,
    /// Item count at submission; never changes
    pub total: u64,
    /// Set at finalize only
    pub success_count: u64,
    pub status: JobStatus,
    pub owner_id: Uuid,
    pub scope_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
}

/// One item of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    pub id: Uuid,
    pub job_id: Uuid,
    /// Submission order, for reporting only
    pub sequence: u32,
    pub item: String,
    pub in_progress: bool,
    pub status: DetailStatus,
    pub message: Option<String>,
    pub primary_status: Option<String>,
    pub secondary_status: Option<String>,
    pub pricing_strategy: Option<String>,
    pub transaction_id: Option<String>,
    pub provider_datetime: Option<String>,
    pub raw_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl JobDetail {
    /// Fresh pending detail
    pub fn pending(job_id: Uuid, sequence: u32, item: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_id,
            sequence,
            item,
            in_progress: false,
            status: DetailStatus::Pending,
            message: None,
            primary_status: None,
            secondary_status: None,
            pricing_strategy: None,
            transaction_id: None,
            provider_datetime: None,
            raw_data: None,
            created_at,
        }
    }

    /// Apply a terminal update in place
    pub fn apply(&mut self, update: &DetailUpdate) {
        self.in_progress = false;
        self.status = update.status;
        self.message = update.message.clone();
        self.primary_status = update.primary_status.clone();
        self.secondary_status = update.secondary_status.clone();
        self.pricing_strategy = update.pricing_strategy.clone();
        self.transaction_id = update.transaction_id.clone();
        self.provider_datetime = update.provider_datetime.clone();
        self.raw_data = update.raw_data.clone();
    }
}

/// The single terminal write for a detail
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailUpdate {
    pub status: DetailStatus,
    pub message: Option<String>,
    pub primary_status: Option<String>,
    pub secondary_status: Option<String>,
    pub pricing_strategy: Option<String>,
    pub transaction_id: Option<String>,
    pub provider_datetime: Option<String>,
    pub raw_data: Option<serde_json::Value>,
}

impl DetailUpdate {
    /// Error outcome carrying only a message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: DetailStatus::Error,
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Detail counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub success: u64,
    pub fail: u64,
    pub error: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.success + self.fail + self.error
    }

    pub fn add(&mut self, status: DetailStatus) {
        match status {
            DetailStatus::Pending => self.pending += 1,
            DetailStatus::Success => self.success += 1,
            DetailStatus::Fail => self.fail += 1,
            DetailStatus::Error => self.error += 1,
        }
    }

    pub fn percentages(&self) -> OutcomePercentages {
        let total = self.total();
        let pct = |count: u64| {
            if total == 0 {
                0.0
            } else {
                ((count as f64 / total as f64) * 10_000.0).round() / 100.0
            }
        };
        OutcomePercentages {
            success: pct(self.success),
            fail: pct(self.fail),
            error: pct(self.error),
        }
    }
}

impl FromIterator<DetailStatus> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = DetailStatus>>(iter: I) -> Self {
        let mut counts = StatusCounts::default();
        for status in iter {
            counts.add(status);
        }
        counts
    }
}

/// Share of details per outcome, two decimals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomePercentages {
    pub success: f64,
    pub fail: f64,
    pub error: f64,
}

/// Inclusive `created_at` window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

/// Store query for jobs
#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    pub visibility: Visibility,
    pub range: DateRange,
    pub product: Option<ProductType>,
    pub offset: u64,
    pub limit: u64,
}

/// Store query for the details of one job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailQuery {
    /// Case-sensitive substring of the item or message
    pub keyword: Option<String>,
    pub status: Option<DetailStatus>,
    pub offset: u64,
    pub limit: u64,
}

impl DetailQuery {
    pub fn matches(&self, detail: &JobDetail) -> bool {
        let keyword_ok = self.keyword.as_deref().is_none_or(|keyword| {
            detail.item.contains(keyword)
                || detail
                    .message
                    .as_deref()
                    .is_some_and(|message| message.contains(keyword))
        });
        let status_ok = self.status.is_none_or(|status| detail.status == status);
        keyword_ok && status_ok
    }
}

/// Pagination request, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.page == 0 {
            return Err("Page must be greater than 0".to_string());
        }
        if self.limit == 0 {
            return Err("Limit must be greater than 0".to_string());
        }
        if self.limit > 1000 {
            return Err("Limit cannot exceed 1000".to_string());
        }
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub total: u64,
}
