//! Tracing initialization for the Veo MCP server.
//!
//! Sets up the tracing subscriber with environment-based filtering via the
//! `RUST_LOG` environment variable, e.g.:
//!
//! - `RUST_LOG=debug` - debug logging for all modules
//! - `RUST_LOG=veo_mcp_video=debug` - debug for the server crate only
//! - `RUST_LOG=warn,veo_mcp_common=debug` - warn by default, debug for common
//!
//! Logs carry a timestamp, level, target module, and structured fields.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Defaults to `info` when `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if called more than once, as the global subscriber can only be
/// set once.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Try to initialize tracing, returning an error if already initialized.
///
/// Unlike `init_tracing()`, this does not panic if the subscriber is already
/// set, which is useful for tests.
pub fn try_init_tracing() -> Result<(), ()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|_| ())
}
