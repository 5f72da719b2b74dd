//! MCP resources for the video server.
//!
//! This module provides resource implementations for:
//! - `video://models` - List available video generation models
//! - `video://providers` - List available video providers

use serde::Serialize;
use veo_mcp_common::models::VEO_MODELS;

/// Information about an available video generation model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    /// Model identifier
    pub id: &'static str,
    /// Model aliases
    pub aliases: Vec<&'static str>,
    /// Supported aspect ratios
    pub supported_aspect_ratios: Vec<&'static str>,
    /// Supported durations in seconds
    pub supported_durations: Vec<u8>,
    /// Duration used when the caller omits one
    pub default_duration: u8,
    /// Supported output resolutions
    pub supported_resolutions: Vec<&'static str>,
    /// Accepted person-generation policies
    pub person_generation_options: Vec<&'static str>,
}

/// Information about an available video provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    /// Provider identifier
    pub id: String,
    /// Provider display name
    pub name: String,
    /// Provider description
    pub description: String,
    /// Whether this is the default provider
    pub is_default: bool,
}

/// List all available video generation models.
pub fn list_models() -> Vec<ModelInfo> {
    VEO_MODELS
        .iter()
        .map(|m| ModelInfo {
            id: m.id,
            aliases: m.aliases.to_vec(),
            supported_aspect_ratios: m.supported_aspect_ratios.to_vec(),
            supported_durations: m.supported_durations.to_vec(),
            default_duration: m.default_duration,
            supported_resolutions: m.supported_resolutions.to_vec(),
            person_generation_options: m.person_generation_options.to_vec(),
        })
        .collect()
}

/// List all available video providers.
pub fn list_providers() -> Vec<ProviderInfo> {
    vec![ProviderInfo {
        id: "gemini-veo".to_string(),
        name: "Gemini API Veo".to_string(),
        description: "Google's Gemini API Veo models for high-quality video generation"
            .to_string(),
        is_default: true,
    }]
}

/// Get models resource as JSON string.
pub fn models_resource_json() -> String {
    serde_json::to_string_pretty(&list_models()).unwrap_or_else(|_| "[]".to_string())
}

/// Get providers resource as JSON string.
pub fn providers_resource_json() -> String {
    serde_json::to_string_pretty(&list_providers()).unwrap_or_else(|_| "[]".to_string())
}
