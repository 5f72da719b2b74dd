//! MCP transport configuration.
//!
//! This module provides a consistent pattern for configuring how the MCP
//! server communicates with its client. Two transport modes are supported:
//!
//! - **Stdio**: Default mode for local subprocess communication
//! - **HTTP**: Streamable HTTP transport for web-based clients
//!
//! # Example
//!
//! ```ignore
//! use veo_mcp_common::transport::TransportArgs;
//! use clap::Parser;
//!
//! #[derive(Parser)]
//! struct Args {
//!     #[command(flatten)]
//!     transport: TransportArgs,
//! }
//!
//! let args = Args::parse();
//! let transport = args.transport.into_transport();
//! ```

use clap::Args;
use std::fmt;

/// Transport mode for MCP server communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Standard input/output transport (default).
    /// Communicates through stdin/stdout, similar to LSP servers.
    #[default]
    Stdio,
    /// HTTP streamable transport.
    /// Runs on a specified port and accepts HTTP connections.
    Http {
        /// Port to listen on
        port: u16,
    },
}

impl Transport {
    /// Create a new stdio transport.
    pub fn stdio() -> Self {
        Transport::Stdio
    }

    /// Create a new HTTP transport on the specified port.
    pub fn http(port: u16) -> Self {
        Transport::Http { port }
    }

    /// Check if this is a stdio transport.
    pub fn is_stdio(&self) -> bool {
        matches!(self, Transport::Stdio)
    }

    /// Check if this is an HTTP transport.
    pub fn is_http(&self) -> bool {
        matches!(self, Transport::Http { .. })
    }

    /// Get the port if this is a network transport.
    pub fn port(&self) -> Option<u16> {
        match self {
            Transport::Stdio => None,
            Transport::Http { port } => Some(*port),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Http { port } => write!(f, "http (port {})", port),
        }
    }
}

/// Command-line arguments for transport configuration.
///
/// Use with `clap::Parser` to add transport options to your CLI:
///
/// ```ignore
/// #[derive(Parser)]
/// struct MyArgs {
///     #[command(flatten)]
///     transport: TransportArgs,
/// }
/// ```
#[derive(Args, Debug, Clone)]
pub struct TransportArgs {
    /// Transport mode: stdio or http
    #[arg(long, default_value = "stdio", value_parser = parse_transport_mode)]
    pub transport: TransportMode,

    /// Port for HTTP transport (default: 8080, or from PORT env var)
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,
}

/// Transport mode parsed from command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    #[default]
    Stdio,
    Http,
}

fn parse_transport_mode(s: &str) -> Result<TransportMode, String> {
    match s.to_lowercase().as_str() {
        "stdio" => Ok(TransportMode::Stdio),
        "http" => Ok(TransportMode::Http),
        _ => Err(format!(
            "Invalid transport mode '{}'. Valid options: stdio, http",
            s
        )),
    }
}

impl TransportArgs {
    /// Convert command-line arguments into a Transport configuration.
    pub fn into_transport(self) -> Transport {
        match self.transport {
            TransportMode::Stdio => Transport::Stdio,
            TransportMode::Http => Transport::Http { port: self.port },
        }
    }
}

impl Default for TransportArgs {
    fn default() -> Self {
        Self {
            transport: TransportMode::Stdio,
            port: 8080,
        }
    }
}
