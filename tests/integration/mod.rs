//! Integration tests for verification-gateway
//!
//! These tests drive the public API end to end with a scripted provider in place of
//! the external verification services.

pub mod export_tests;
pub mod job_lifecycle_tests;
pub mod seaorm_store_tests;
pub mod server_tests;
