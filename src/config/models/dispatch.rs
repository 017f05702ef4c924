//! Dispatcher throttle and timeout settings

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How fast the dispatcher launches provider calls
///
/// This is a launch-rate throttle: after every `batch_size` launches the dispatcher
/// sleeps `pause_ms` before launching more. In-flight calls are not capped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Launches between two pauses
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between batches in milliseconds
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
    /// Deadline for a single provider call in seconds
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            pause_ms: default_pause_ms(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

impl DispatchConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate dispatch configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("Dispatch batch size cannot be 0".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("Provider call timeout cannot be 0".to_string());
        }
        Ok(())
    }
}
