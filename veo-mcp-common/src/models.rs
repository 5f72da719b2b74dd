//! Model definitions and registry for the Veo video-generation family.
//!
//! This module provides static model definitions and a registry for resolving
//! model names and aliases to their full definitions. The per-model tables
//! (durations, aspect ratios, resolutions, person-generation policies) drive
//! request validation and defaulting.

use serde::Serialize;

/// Veo model definition.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VeoModel {
    /// Full model identifier
    pub id: &'static str,
    /// Model aliases for convenience
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    /// Supported aspect ratios
    pub supported_aspect_ratios: &'static [&'static str],
    /// Supported durations in seconds (discrete values)
    pub supported_durations: &'static [u8],
    /// Duration used when the caller does not supply one
    pub default_duration: u8,
    /// Supported output resolutions; the first entry is the default
    pub supported_resolutions: &'static [&'static str],
    /// Accepted values for the person-generation policy
    pub person_generation_options: &'static [&'static str],
}

impl VeoModel {
    /// The resolution used when the caller does not supply one.
    pub fn default_resolution(&self) -> &'static str {
        self.supported_resolutions[0]
    }
}

/// Veo 2.0 Generate model (stable)
pub const VEO_2_0_GENERATE_001: VeoModel = VeoModel {
    id: "veo-2.0-generate-001",
    aliases: &["veo-2", "veo-2.0", "veo2"],
    supported_aspect_ratios: &["16:9", "9:16"],
    supported_durations: &[5, 6, 7, 8],
    default_duration: 8,
    supported_resolutions: &["720p"],
    person_generation_options: &["dont_allow", "allow_adult", "allow_all"],
};

/// Veo 3.0 Generate model
pub const VEO_3_0_GENERATE_001: VeoModel = VeoModel {
    id: "veo-3.0-generate-001",
    aliases: &["veo-3", "veo-3.0", "veo3"],
    supported_aspect_ratios: &["16:9", "9:16"],
    supported_durations: &[4, 6, 8],
    default_duration: 8,
    supported_resolutions: &["720p", "1080p"],
    person_generation_options: &["dont_allow", "allow_adult"],
};

/// Veo 3.0 Fast Generate model
pub const VEO_3_0_FAST_GENERATE_001: VeoModel = VeoModel {
    id: "veo-3.0-fast-generate-001",
    aliases: &["veo-3-fast", "veo-3.0-fast", "veo3-fast"],
    supported_aspect_ratios: &["16:9", "9:16"],
    supported_durations: &[4, 6, 8],
    default_duration: 8,
    supported_resolutions: &["720p", "1080p"],
    person_generation_options: &["dont_allow", "allow_adult"],
};

/// Veo 3.1 Generate Preview model
pub const VEO_3_1_GENERATE_PREVIEW: VeoModel = VeoModel {
    id: "veo-3.1-generate-preview",
    aliases: &["veo-3.1", "veo31", "veo-3.1-preview"],
    supported_aspect_ratios: &["16:9", "9:16"],
    supported_durations: &[4, 6, 8],
    default_duration: 8,
    supported_resolutions: &["720p", "1080p"],
    person_generation_options: &["dont_allow", "allow_adult"],
};

/// All available Veo models
pub const VEO_MODELS: &[VeoModel] = &[
    VEO_2_0_GENERATE_001,
    VEO_3_0_GENERATE_001,
    VEO_3_0_FAST_GENERATE_001,
    VEO_3_1_GENERATE_PREVIEW,
];

/// Default model for video generation.
pub const DEFAULT_MODEL: &str = "veo-3.0-generate-001";

/// Model registry for resolution and listing.
///
/// Provides methods to resolve model names or aliases to their full
/// definitions, and to list all available models.
pub struct ModelRegistry;

impl ModelRegistry {
    /// Resolve a Veo model name or alias to full model definition.
    ///
    /// Accepts either the canonical model ID (e.g., "veo-3.0-generate-001")
    /// or any of its aliases (e.g., "veo-3", "veo3").
    ///
    /// # Examples
    ///
    /// ```
    /// use veo_mcp_common::models::ModelRegistry;
    ///
    /// // Resolve by canonical ID
    /// let model = ModelRegistry::resolve("veo-3.0-generate-001");
    /// assert!(model.is_some());
    ///
    /// // Resolve by alias
    /// let model = ModelRegistry::resolve("veo-3");
    /// assert!(model.is_some());
    /// ```
    pub fn resolve(name: &str) -> Option<&'static VeoModel> {
        VEO_MODELS
            .iter()
            .find(|model| model.id == name || model.aliases.contains(&name))
    }

    /// List all available Veo models.
    ///
    /// # Examples
    ///
    /// ```
    /// use veo_mcp_common::models::ModelRegistry;
    ///
    /// let models = ModelRegistry::list();
    /// assert!(!models.is_empty());
    /// ```
    pub fn list() -> &'static [VeoModel] {
        VEO_MODELS
    }
}
