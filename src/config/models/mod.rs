//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

pub mod dispatch;
pub mod gateway;
pub mod provider;
pub mod server;
pub mod storage;

// Re-export all configuration types
pub use dispatch::*;
pub use gateway::*;
pub use provider::*;
pub use server::*;
pub use storage::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

/// Launches per throttle batch
pub fn default_batch_size() -> usize {
    100
}

/// Pause between throttle batches, in milliseconds
pub fn default_pause_ms() -> u64 {
    1000
}

/// Per-call provider timeout in seconds
pub fn default_call_timeout_secs() -> u64 {
    5
}
