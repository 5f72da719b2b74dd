//! Error types for the common library.
//!
//! This module provides a unified error hierarchy using `thiserror` for
//! consistent error handling across the Veo MCP server.
//!
//! # Error Categories
//!
//! - `ConfigError`: Missing or invalid configuration
//! - `Error::Transport`: network failures, auth failures, remote 4xx/5xx
//! - `Error::Validation`: input validation failures
//! - `Error::RemoteOperation`: the remote service reports the operation
//!   itself failed (distinct from a transport failure)
//! - `Error::Io`: file system operations
//!
//! A wait deadline elapsing is deliberately *not* an error: it is a valid
//! outcome of a wait call and is modeled by the poller's outcome type.

use thiserror::Error;

/// Unified error type for the common library.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (missing env vars, invalid values)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transport errors with endpoint and HTTP status context
    ///
    /// Covers network failures (status code 0), authentication failures, and
    /// remote 4xx/5xx responses. Not retried automatically within a single
    /// submit or fetch call.
    #[error("Transport error for {endpoint} (HTTP {status_code}): {message}")]
    Transport {
        /// The endpoint that was called
        endpoint: String,
        /// HTTP status code returned (0 when the request never completed)
        status_code: u16,
        /// Error message from the service or describing the failure
        message: String,
    },

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote service reported that the operation itself failed.
    ///
    /// Carries the code and message verbatim from the service, plus a
    /// human-readable hint derived from the status code.
    #[error("Remote operation failed (code {code}): {message}. {hint}")]
    RemoteOperation {
        /// Status code reported by the service
        code: i32,
        /// Message reported by the service, verbatim
        message: String,
        /// Human-readable hint for the code
        hint: &'static str,
    },

    /// File system I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new transport error with endpoint, status code, and message.
    ///
    /// # Example
    ///
    /// ```
    /// use veo_mcp_common::error::Error;
    ///
    /// let err = Error::transport(
    ///     "https://api.example.com/v1beta/operations/abc",
    ///     500,
    ///     "Internal server error"
    /// );
    /// assert!(err.to_string().contains("api.example.com"));
    /// assert!(err.to_string().contains("500"));
    /// ```
    pub fn transport(
        endpoint: impl Into<String>,
        status_code: u16,
        message: impl Into<String>,
    ) -> Self {
        Error::Transport {
            endpoint: endpoint.into(),
            status_code,
            message: message.into(),
        }
    }

    /// Create a new validation error.
    ///
    /// # Example
    ///
    /// ```
    /// use veo_mcp_common::error::Error;
    ///
    /// let err = Error::validation("prompt cannot be empty");
    /// assert!(err.to_string().contains("prompt cannot be empty"));
    /// ```
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Create a new remote-operation error, deriving the hint from the code.
    ///
    /// # Example
    ///
    /// ```
    /// use veo_mcp_common::error::Error;
    ///
    /// let err = Error::remote_operation(7, "denied");
    /// let msg = err.to_string();
    /// assert!(msg.contains("code 7"));
    /// assert!(msg.contains("denied"));
    /// ```
    pub fn remote_operation(code: i32, message: impl Into<String>) -> Self {
        Error::RemoteOperation {
            code,
            message: message.into(),
            hint: status_hint(code),
        }
    }
}

/// Map a remote status code to a human-readable hint.
///
/// The codes follow the google.rpc.Code convention used by the upstream
/// service's operation errors.
pub fn status_hint(code: i32) -> &'static str {
    match code {
        3 => "The request was rejected as invalid; check the prompt and parameter values.",
        4 => "The service gave up on the job before it finished; resubmit the request.",
        5 => "The operation name was not recognized; it may have expired or never existed.",
        7 => "Access was denied; check that the API key is valid and has access to this model.",
        8 => "Quota was exhausted; wait for the quota window to reset before retrying.",
        9 | 11 => "The request conflicted with the current service state; resubmit the request.",
        13 | 14 => "The service hit a transient internal problem; resubmitting usually succeeds.",
        _ => "The service reported an unexpected failure for this operation.",
    }
}

/// Configuration errors.
///
/// These errors occur when loading or validating configuration from
/// environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Required environment variable {0} is not set")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    /// Create a new missing environment variable error.
    pub fn missing_env_var(name: impl Into<String>) -> Self {
        ConfigError::MissingEnvVar(name.into())
    }

    /// Create a new invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;
