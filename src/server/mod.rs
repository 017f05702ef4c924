//! HTTP server implementation
//!
//! This module provides the HTTP server and routing functionality.

pub mod builder;
pub mod context;
pub mod routes;
pub mod server;
pub mod state;

pub use builder::{load_config, run_server};
pub use server::HttpServer;
pub use state::AppState;
