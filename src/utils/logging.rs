//! Tracing subscriber setup
//!
//! The filter comes from `RUST_LOG` when set, otherwise `info` for the gateway and
//! `warn` for the SQL driver.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Directives used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,sea_orm_migration=warn";

/// Build the env filter from `RUST_LOG` or [`DEFAULT_FILTER`]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber
///
/// `json` switches to one JSON object per line. Calling this twice is harmless; the
/// second install is ignored.
pub fn init_tracing(json: bool) {
    let registry = tracing_subscriber::registry().with(env_filter());

    let result = if json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_thread_ids(false))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
