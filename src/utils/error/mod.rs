//! Error Handling utilities

pub mod error;

pub use error::*;
