//! Configuration module for loading environment variables and settings.

use crate::error::ConfigError;

/// Default base endpoint for the Gemini API.
pub const DEFAULT_API_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key (required)
    pub api_key: String,
    /// Base URL of the Gemini API. Overridable for tests and proxies.
    pub api_endpoint: String,
    /// HTTP server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingEnvVar` if GEMINI_API_KEY is not set.
    /// A missing credential is the only fatal startup condition.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;

        let api_endpoint = std::env::var("GEMINI_API_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_API_ENDPOINT.to_string());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Ok(Self {
            api_key,
            api_endpoint,
            port,
        })
    }

    /// Get the URL for a model verb, e.g. `models/{model}:predictLongRunning`.
    pub fn model_url(&self, model: &str, verb: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.api_endpoint.trim_end_matches('/'),
            model,
            verb
        )
    }

    /// Get the URL for a fully qualified operation name.
    pub fn operation_url(&self, operation_name: &str) -> String {
        format!(
            "{}/v1beta/{}",
            self.api_endpoint.trim_end_matches('/'),
            operation_name
        )
    }
}
