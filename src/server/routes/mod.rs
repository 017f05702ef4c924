//! HTTP route modules
//!
//! This module contains all HTTP route handlers organized by functionality.

pub mod health;
pub mod jobs;
pub mod verifications;

use crate::core::jobs::{DateRange, Page, PageRequest};
use crate::utils::error::GatewayError;
use actix_web::HttpResponse;
use actix_web::http::header;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Standard API response structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: serde::Serialize,
{
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PaginationMeta {
    /// Current page number
    pub page: u64,
    /// Number of items per page
    pub limit: u64,
    /// Total number of items
    pub total: u64,
    /// Total number of pages
    pub pages: u64,
    /// Whether there is a next page
    pub has_next: bool,
    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let pages = total.div_ceil(limit.max(1));

        Self {
            page,
            limit,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PaginatedResponse<T> {
    /// Response items
    pub items: Vec<T>,
    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> From<Page<T>> for PaginatedResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            pagination: PaginationMeta::new(page.page, page.limit, page.total),
            items: page.items,
        }
    }
}

/// Query parameters for pagination
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PaginationQuery {
    /// Page number (1-based)
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationQuery {
    /// Validated page request
    pub fn to_page_request(&self) -> Result<PageRequest, GatewayError> {
        let request = PageRequest::new(self.page, self.limit);
        request.validate().map_err(GatewayError::BadRequest)?;
        Ok(request)
    }
}

/// `from` / `to` query parameters
///
/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates; a plain `to` date covers
/// the whole day.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRangeQuery {
    pub fn to_range(&self) -> Result<DateRange, GatewayError> {
        let from = self
            .from
            .as_deref()
            .map(|raw| parse_instant(raw, NaiveTime::MIN))
            .transpose()?;
        let to = self
            .to
            .as_deref()
            .map(|raw| parse_instant(raw, end_of_day()))
            .transpose()?;

        if matches!((from, to), (Some(from), Some(to)) if from > to) {
            return Err(GatewayError::BadRequest(
                "`from` must not be after `to`".to_string(),
            ));
        }
        Ok(DateRange::new(from, to))
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn parse_instant(raw: &str, time_of_day: NaiveTime) -> Result<DateTime<Utc>, GatewayError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(time_of_day).and_utc())
        .map_err(|_| GatewayError::BadRequest(format!("invalid date: {}", raw)))
}

/// `Content-Disposition` header offering `filename` as a download
pub fn attachment_disposition(filename: &str) -> (header::HeaderName, String) {
    (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename={}", filename),
    )
}

/// `200 OK` CSV attachment
pub fn csv_attachment(filename: &str, body: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(attachment_disposition(filename))
        .body(body)
}
