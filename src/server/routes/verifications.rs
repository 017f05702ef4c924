//! Submission endpoints

use crate::core::jobs::RequestContext;
use crate::core::jobs::import::parse_items;
use crate::core::providers::ProductType;
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Single-item request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleRequest {
    pub item: String,
}

/// Batch request body (JSON form)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub items: Vec<String>,
}

/// Configure submission routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1/verifications")
            .route("/{product}", web::post().to(submit_single))
            .route("/{product}/batch", web::post().to(submit_batch)),
    );
}

fn parse_product(raw: &str) -> Result<ProductType, GatewayError> {
    raw.parse()
        .map_err(|_| GatewayError::not_found(format!("unknown product: {}", raw)))
}

/// Verify one item; the classified detail is returned inline
pub async fn submit_single(
    state: web::Data<AppState>,
    ctx: RequestContext,
    product: web::Path<String>,
    body: web::Json<SingleRequest>,
) -> Result<HttpResponse, GatewayError> {
    let product = parse_product(&product)?;
    let result = state
        .service
        .submit_single(&ctx, product, body.into_inner().item)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(result)))
}

/// Verify a batch; answers once every item is done
///
/// The body is either `{"items": [...]}` or a `text/csv` upload.
pub async fn submit_batch(
    state: web::Data<AppState>,
    ctx: RequestContext,
    product: web::Path<String>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, GatewayError> {
    let product = parse_product(&product)?;

    let is_csv = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/csv"));
    let items = if is_csv {
        parse_items(&body[..])?
    } else {
        serde_json::from_slice::<BatchRequest>(&body)
            .map_err(|e| GatewayError::BadRequest(format!("invalid batch body: {}", e)))?
            .items
    };

    info!(product = %product, items = items.len(), csv = is_csv, "Batch submitted");
    let ack = state.service.submit_batch(&ctx, product, items).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ack)))
}
