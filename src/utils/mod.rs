//! Utility modules for the verification gateway
//!
//! - **error**: the crate error type and its HTTP mapping
//! - **logging**: tracing subscriber setup

pub mod error;
pub mod logging;

pub use error::{GatewayError, Result};
pub use logging::init_tracing;
