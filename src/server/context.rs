//! Request context extraction
//!
//! Callers identify themselves with three headers. The gateway trusts them; an
//! upstream service is expected to have authenticated the caller already.

use crate::core::jobs::{RequestContext, Role};
use crate::utils::error::GatewayError;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{Ready, ready};
use uuid::Uuid;

pub const OWNER_HEADER: &str = "x-owner-id";
pub const SCOPE_HEADER: &str = "x-scope-id";
pub const ROLE_HEADER: &str = "x-role";

fn header<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, GatewayError> {
    req.headers()
        .get(name)
        .ok_or_else(|| GatewayError::Unauthorized(format!("missing {} header", name)))?
        .to_str()
        .map_err(|_| GatewayError::Unauthorized(format!("invalid {} header", name)))
}

fn uuid_header(req: &HttpRequest, name: &str) -> Result<Uuid, GatewayError> {
    header(req, name)?
        .trim()
        .parse()
        .map_err(|_| GatewayError::Unauthorized(format!("{} must be a uuid", name)))
}

/// Read the caller's identity from the request headers
pub fn request_context(req: &HttpRequest) -> Result<RequestContext, GatewayError> {
    let owner_id = uuid_header(req, OWNER_HEADER)?;
    let scope_id = uuid_header(req, SCOPE_HEADER)?;
    let role: Role = header(req, ROLE_HEADER)?
        .trim()
        .parse()
        .map_err(GatewayError::Unauthorized)?;

    Ok(RequestContext::new(owner_id, scope_id, role))
}

impl FromRequest for RequestContext {
    type Error = GatewayError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(request_context(req))
    }
}
