//! Job query and export endpoints

use crate::core::jobs::{DetailFilter, DetailStatus, JobFilter, RequestContext};
use crate::core::providers::ProductType;
use crate::server::routes::{
    ApiResponse, DateRangeQuery, PaginatedResponse, PaginationQuery, attachment_disposition,
    csv_attachment,
};
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Query structs spell their fields out; `serde(flatten)` loses numeric types under
// url-encoded deserialization.

/// `GET /v1/jobs` query
#[derive(Debug, Clone, Deserialize)]
pub struct JobListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub from: Option<String>,
    pub to: Option<String>,
    pub product: Option<String>,
}

impl JobListQuery {
    fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
    }

    fn range(&self) -> DateRangeQuery {
        DateRangeQuery {
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

/// `GET /v1/jobs/{id}/details` query
#[derive(Debug, Clone, Deserialize)]
pub struct DetailListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub keyword: Option<String>,
    pub status: Option<String>,
}

fn default_page() -> u64 {
    PaginationQuery::default().page
}

fn default_limit() -> u64 {
    PaginationQuery::default().limit
}

/// Details page as returned over HTTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetailsResponse {
    pub job: crate::core::jobs::Job,
    pub details: PaginatedResponse<crate::core::jobs::JobDetail>,
    pub counts: crate::core::jobs::StatusCounts,
    pub percentages: crate::core::jobs::OutcomePercentages,
}

/// Configure job routes
///
/// `summary` and `export` are registered ahead of `{id}` so they are not taken for ids.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/jobs")
            .route("", web::get().to(list_jobs))
            .route("/summary", web::get().to(jobs_summary))
            .route("/export", web::get().to(export_range))
            .route("/{id}", web::get().to(get_job))
            .route("/{id}/details", web::get().to(get_job_details))
            .route("/{id}/export", web::get().to(export_job)),
    );
}

async fn list_jobs(
    state: web::Data<AppState>,
    ctx: RequestContext,
    query: web::Query<JobListQuery>,
) -> Result<HttpResponse, GatewayError> {
    let product = query
        .product
        .as_deref()
        .map(|raw| raw.parse::<ProductType>().map_err(GatewayError::BadRequest))
        .transpose()?;
    let filter = JobFilter {
        range: query.range().to_range()?,
        product,
        page: query.pagination().to_page_request()?,
    };

    let page = state.manager.get_jobs(&ctx, &filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(PaginatedResponse::from(page))))
}

async fn jobs_summary(
    state: web::Data<AppState>,
    ctx: RequestContext,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, GatewayError> {
    let summary = state.manager.jobs_summary(&ctx, query.to_range()?).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}

async fn get_job(
    state: web::Data<AppState>,
    ctx: RequestContext,
    job_id: web::Path<Uuid>,
) -> Result<HttpResponse, GatewayError> {
    let job = state.manager.get_job(&ctx, *job_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(job)))
}

async fn get_job_details(
    state: web::Data<AppState>,
    ctx: RequestContext,
    job_id: web::Path<Uuid>,
    query: web::Query<DetailListQuery>,
) -> Result<HttpResponse, GatewayError> {
    let status = query
        .status
        .as_deref()
        .map(|raw| raw.parse::<DetailStatus>().map_err(GatewayError::BadRequest))
        .transpose()?;
    let filter = DetailFilter {
        keyword: query.keyword.clone(),
        status,
        page: PaginationQuery {
            page: query.page,
            limit: query.limit,
        }
        .to_page_request()?,
    };

    let page = state.manager.get_job_details(&ctx, *job_id, &filter).await?;
    let response = JobDetailsResponse {
        job: page.job,
        details: page.details.into(),
        counts: page.counts,
        percentages: page.percentages,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

async fn export_job(
    state: web::Data<AppState>,
    ctx: RequestContext,
    job_id: web::Path<Uuid>,
) -> Result<HttpResponse, GatewayError> {
    let export = state.exporter.export_job(&ctx, *job_id).await?;
    Ok(csv_attachment(&export.filename, export.body))
}

async fn export_range(
    state: web::Data<AppState>,
    ctx: RequestContext,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, GatewayError> {
    let export = state.exporter.export_range(&ctx, query.to_range()?).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(attachment_disposition(&export.filename))
        .streaming(export.into_stream()))
}
