//! Common test utilities for verification-gateway
//!
//! - Fixtures for request contexts and items
//! - A scripted provider standing in for the external verification APIs
//! - Helpers that wire a `VerificationService` over a given store

pub mod providers;

pub use fixtures::{admin_in, fast_dispatch, member, member_in, phone_numbers, wire_service};
pub use providers::{Reply, ScriptedProvider};
