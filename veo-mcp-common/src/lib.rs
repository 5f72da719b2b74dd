//! Veo MCP Common Library
//!
//! Shared utilities for configuration, model definitions, error handling,
//! transport selection, and tracing for the Veo MCP server.

pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod tracing;
pub mod transport;

#[cfg(test)]
mod transport_test;

pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use server::{McpServerBuilder, ServerError, shutdown_channel};
pub use transport::{Transport, TransportArgs, TransportMode};
