//! Core functionality for the Gateway
//!
//! Provider adapters, item validation and the bulk job pipeline.

pub mod jobs;
pub mod providers;
pub mod validation;
