//! Structured logging initialization
//!
//! Provides consistent logging initialization across all setup binaries.

use crate::config::SetupEnv;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Guard that keeps the tracing subscriber active.
/// Drop this at the end of main to flush logs.
pub struct LogGuard;

/// Initialize structured logging for a component.
///
/// Honors `RUST_LOG` on top of an `info` default and switches to JSON lines
/// when `SETUP_LOG_FORMAT=json`.
///
/// # Example
/// ```ignore
/// let _guard = init_logging("bootstrap");
/// info!("Starting up...");
/// ```
pub fn init_logging(_component: &str) -> LogGuard {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let registry = tracing_subscriber::registry().with(filter);

    // try_init: tests and re-entrant callers may already have a subscriber
    let _ = if SetupEnv::json_logs() {
        registry
            .with(fmt::layer().json().with_target(false))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    LogGuard
}
