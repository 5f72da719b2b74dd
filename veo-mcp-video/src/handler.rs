//! Video generation handler for the Veo MCP server.
//!
//! This module provides the `VideoHandler` struct and parameter types for
//! submitting generation jobs to the Gemini API and fetching the state of
//! their long-running operations.

use crate::operation::{OperationName, OperationSnapshot};
use crate::poller::{self, StatusSource, WaitOptions, WaitOutcome};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};
use veo_mcp_common::config::Config;
use veo_mcp_common::error::Error;
use veo_mcp_common::models::{ModelRegistry, VeoModel, DEFAULT_MODEL, VEO_MODELS};

/// Default aspect ratio.
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// Default person-generation policy.
pub const DEFAULT_PERSON_GENERATION: &str = "allow_adult";

/// Video generation parameters.
///
/// Duration and resolution are model-dependent; when omitted they are
/// defaulted from the resolved model before the request is built.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct VideoGenerateParams {
    /// Text prompt describing the video to generate.
    pub prompt: String,

    /// Model to use for generation.
    /// Defaults to "veo-3.0-generate-001".
    #[serde(default = "default_model")]
    pub model: String,

    /// Aspect ratio for the generated video.
    /// Valid values: "16:9", "9:16".
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,

    /// Duration of the video in seconds (model-dependent discrete values).
    /// Defaults to the model's own default duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u8>,

    /// Output resolution ("720p", "1080p" where supported).
    /// Defaults to the model's default resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    /// Person-generation policy: "dont_allow", "allow_adult", or "allow_all"
    /// where the model supports it.
    #[serde(default = "default_person_generation")]
    pub person_generation: String,

    /// Text describing what the video should not contain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,

    /// Source image for image-to-video generation.
    /// Can be raw base64 data or a local file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_aspect_ratio() -> String {
    DEFAULT_ASPECT_RATIO.to_string()
}

fn default_person_generation() -> String {
    DEFAULT_PERSON_GENERATION.to_string()
}

/// Validation error details for video generation parameters.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl VideoGenerateParams {
    /// Validate the parameters against the resolved model's constraints.
    ///
    /// # Returns
    /// - `Ok(())` if all parameters are valid
    /// - `Err(Vec<ValidationError>)` with all validation errors
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.prompt.trim().is_empty() {
            errors.push(ValidationError {
                field: "prompt".to_string(),
                message: "Prompt cannot be empty".to_string(),
            });
        }

        let Some(model) = self.resolved_model() else {
            errors.push(ValidationError {
                field: "model".to_string(),
                message: format!(
                    "Unknown model '{}'. Valid models: {}",
                    self.model,
                    VEO_MODELS.iter().map(|m| m.id).collect::<Vec<_>>().join(", ")
                ),
            });
            // Model-dependent checks are meaningless without a model
            return Err(errors);
        };

        if !model.supported_aspect_ratios.contains(&self.aspect_ratio.as_str()) {
            errors.push(ValidationError {
                field: "aspect_ratio".to_string(),
                message: format!(
                    "Invalid aspect ratio '{}'. Valid options for {}: {}",
                    self.aspect_ratio,
                    model.id,
                    model.supported_aspect_ratios.join(", ")
                ),
            });
        }

        if let Some(duration) = self.duration_seconds {
            if !model.supported_durations.contains(&duration) {
                let durations: Vec<String> =
                    model.supported_durations.iter().map(|d| d.to_string()).collect();
                errors.push(ValidationError {
                    field: "duration_seconds".to_string(),
                    message: format!(
                        "duration_seconds must be one of [{}] for model {}, got {}",
                        durations.join(", "),
                        model.id,
                        duration
                    ),
                });
            }
        }

        if let Some(ref resolution) = self.resolution {
            if !model.supported_resolutions.contains(&resolution.as_str()) {
                errors.push(ValidationError {
                    field: "resolution".to_string(),
                    message: format!(
                        "Invalid resolution '{}'. Valid options for {}: {}",
                        resolution,
                        model.id,
                        model.supported_resolutions.join(", ")
                    ),
                });
            }
        }

        if !model
            .person_generation_options
            .contains(&self.person_generation.as_str())
        {
            errors.push(ValidationError {
                field: "person_generation".to_string(),
                message: format!(
                    "Invalid person_generation '{}'. Valid options for {}: {}",
                    self.person_generation,
                    model.id,
                    model.person_generation_options.join(", ")
                ),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get the resolved model definition.
    pub fn resolved_model(&self) -> Option<&'static VeoModel> {
        ModelRegistry::resolve(&self.model)
    }
}

/// Video generation handler.
///
/// Submits generation requests to the Gemini API and fetches operation
/// snapshots. Carries no per-operation state: the remote service is the
/// single source of truth and every fetch is a fresh read.
pub struct VideoHandler {
    /// Application configuration.
    config: Config,
    /// HTTP client for API requests.
    http: reqwest::Client,
}

impl VideoHandler {
    /// Create a new VideoHandler with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Get the endpoint that starts a generation operation for a model.
    pub fn generate_endpoint(&self, model: &str) -> String {
        self.config.model_url(model, "predictLongRunning")
    }

    /// Get the endpoint that returns the state of an operation.
    pub fn operation_endpoint(&self, name: &OperationName) -> String {
        self.config.operation_url(name.as_str())
    }

    /// Submit a video generation request.
    ///
    /// Starts the remote job and returns its operation name immediately; the
    /// caller polls for completion separately.
    ///
    /// # Errors
    /// Returns `Error::Validation` for bad parameters (before any remote
    /// call) and `Error::Transport` for request failures.
    #[instrument(level = "info", name = "submit_video", skip(self, params), fields(model = %params.model, aspect_ratio = %params.aspect_ratio))]
    pub async fn submit(&self, params: VideoGenerateParams) -> Result<OperationName, Error> {
        params.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            Error::validation(messages.join("; "))
        })?;

        // validate() guarantees the model resolves
        let model = params
            .resolved_model()
            .ok_or_else(|| Error::validation(format!("Unknown model: {}", params.model)))?;

        let image = match params.image.as_deref() {
            Some(raw) => Some(self.resolve_image_input(raw).await?),
            None => None,
        };

        info!(model_id = model.id, "Submitting video generation request");

        let request = GenerateVideoRequest {
            instances: vec![VideoInstance {
                prompt: params.prompt.clone(),
                image,
            }],
            parameters: VideoParameters {
                aspect_ratio: params.aspect_ratio.clone(),
                duration_seconds: params.duration_seconds.unwrap_or(model.default_duration),
                resolution: Some(
                    params
                        .resolution
                        .clone()
                        .unwrap_or_else(|| model.default_resolution().to_string()),
                ),
                person_generation: params.person_generation.clone(),
                negative_prompt: params.negative_prompt.clone(),
            },
        };

        let endpoint = self.generate_endpoint(model.id);
        debug!(endpoint = %endpoint, "Calling generate endpoint");

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::transport(&endpoint, 0, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::transport(&endpoint, status.as_u16(), body));
        }

        let submitted: SubmitResponse = response.json().await.map_err(|e| {
            Error::transport(
                &endpoint,
                status.as_u16(),
                format!("Failed to parse operation response: {}", e),
            )
        })?;

        let name = OperationName::parse(&submitted.name)?;
        info!(operation = %name, "Started video generation operation");
        Ok(name)
    }

    /// Fetch the current snapshot of an operation.
    ///
    /// Idempotent and uncached: every call is a fresh read of the remote
    /// state.
    #[instrument(level = "debug", name = "fetch_operation", skip(self), fields(operation = %name))]
    pub async fn fetch_operation(&self, name: &OperationName) -> Result<OperationSnapshot, Error> {
        let endpoint = self.operation_endpoint(name);

        let response = self
            .http
            .get(&endpoint)
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| Error::transport(&endpoint, 0, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::transport(&endpoint, status.as_u16(), body));
        }

        let snapshot: OperationSnapshot = response.json().await.map_err(|e| {
            Error::transport(
                &endpoint,
                status.as_u16(),
                format!("Failed to parse operation snapshot: {}", e),
            )
        })?;

        Ok(snapshot)
    }

    /// Wait for an operation to reach a terminal state, bounded by the
    /// caller's poll interval and timeout.
    pub async fn wait(
        &self,
        name: &OperationName,
        options: WaitOptions,
    ) -> Result<WaitOutcome, Error> {
        poller::wait_for_operation(self, name, options).await
    }

    /// Resolve image input to base64 data with a mime type.
    ///
    /// Handles two input formats: raw base64 data or a local file path.
    async fn resolve_image_input(&self, image: &str) -> Result<ImageInput, Error> {
        // Anything shaped like a path is read from disk
        let looks_like_path = image.starts_with('/')
            || image.starts_with("./")
            || image.starts_with("../")
            || image.starts_with("~/")
            || (image.len() < 500 && Self::has_image_extension(image));

        if looks_like_path {
            let path = Path::new(image);
            if !path.exists() {
                return Err(Error::validation(format!("Image file not found: {}", image)));
            }
            let data = tokio::fs::read(path).await?;
            return Ok(ImageInput {
                bytes_base64_encoded: BASE64.encode(&data),
                mime_type: Self::mime_type_for_path(image).to_string(),
            });
        }

        // Base64 payloads are long; validate by decoding
        if image.len() > 100 && BASE64.decode(image).is_ok() {
            return Ok(ImageInput {
                bytes_base64_encoded: image.to_string(),
                mime_type: "image/png".to_string(),
            });
        }

        // Last resort: a relative path without a leading ./
        let path = Path::new(image);
        if path.exists() {
            let data = tokio::fs::read(path).await?;
            return Ok(ImageInput {
                bytes_base64_encoded: BASE64.encode(&data),
                mime_type: Self::mime_type_for_path(image).to_string(),
            });
        }

        Err(Error::validation(format!(
            "Image input '{}' is not a valid file path or base64 data",
            if image.len() > 50 { &image[..50] } else { image }
        )))
    }

    /// Check if a string ends with a common image file extension.
    fn has_image_extension(s: &str) -> bool {
        let lower = s.to_lowercase();
        lower.ends_with(".png")
            || lower.ends_with(".jpg")
            || lower.ends_with(".jpeg")
            || lower.ends_with(".webp")
            || lower.ends_with(".gif")
            || lower.ends_with(".bmp")
    }

    /// Mime type for an image file path, by extension.
    fn mime_type_for_path(path: &str) -> &'static str {
        let lower = path.to_lowercase();
        if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            "image/jpeg"
        } else if lower.ends_with(".webp") {
            "image/webp"
        } else if lower.ends_with(".gif") {
            "image/gif"
        } else {
            "image/png"
        }
    }
}

#[async_trait]
impl StatusSource for VideoHandler {
    async fn fetch_status(&self, name: &OperationName) -> Result<OperationSnapshot, Error> {
        self.fetch_operation(name).await
    }
}

// =============================================================================
// API Request/Response Types
// =============================================================================

/// Gemini API request for video generation.
#[derive(Debug, Serialize)]
pub struct GenerateVideoRequest {
    /// Input instances (prompt and optional image)
    pub instances: Vec<VideoInstance>,
    /// Generation parameters
    pub parameters: VideoParameters,
}

/// One generation instance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInstance {
    /// Text prompt describing the video
    pub prompt: String,
    /// Source image for image-to-video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInput>,
}

/// Inline image input.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    /// Base64-encoded image data
    pub bytes_base64_encoded: String,
    /// MIME type of the image
    pub mime_type: String,
}

/// Generation parameters on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    /// Aspect ratio
    pub aspect_ratio: String,
    /// Duration in seconds
    pub duration_seconds: u8,
    /// Output resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Person-generation policy
    pub person_generation: String,
    /// Negative prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

/// Response to a submission: the operation handle to poll.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Operation name for polling
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_params() -> VideoGenerateParams {
        VideoGenerateParams {
            prompt: "A slow pan across a foggy harbor at dawn".to_string(),
            model: "veo-3".to_string(),
            aspect_ratio: "16:9".to_string(),
            duration_seconds: Some(8),
            resolution: Some("720p".to_string()),
            person_generation: "allow_adult".to_string(),
            negative_prompt: None,
            image: None,
        }
    }

    #[test]
    fn test_default_params() {
        let params: VideoGenerateParams = serde_json::from_str(r#"{
            "prompt": "A cat walking"
        }"#).unwrap();
        assert_eq!(params.model, DEFAULT_MODEL);
        assert_eq!(params.aspect_ratio, DEFAULT_ASPECT_RATIO);
        assert_eq!(params.person_generation, DEFAULT_PERSON_GENERATION);
        assert!(params.duration_seconds.is_none());
        assert!(params.resolution.is_none());
        assert!(params.image.is_none());
    }

    #[test]
    fn test_valid_params() {
        assert!(valid_params().validate().is_ok());
    }

    #[test]
    fn test_empty_prompt() {
        let mut params = valid_params();
        params.prompt = "   ".to_string();
        let errors = params.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "prompt"));
    }

    #[test]
    fn test_unknown_model() {
        let mut params = valid_params();
        params.model = "unknown-model".to_string();
        let errors = params.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "model"));
    }

    #[test]
    fn test_invalid_aspect_ratio() {
        let mut params = valid_params();
        params.aspect_ratio = "4:3".to_string();
        let errors = params.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "aspect_ratio"));
    }

    #[test]
    fn test_unsupported_duration() {
        let mut params = valid_params();
        params.duration_seconds = Some(15);
        let errors = params.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "duration_seconds"));
    }

    #[test]
    fn test_duration_supported_by_one_model_but_not_another() {
        // 5 seconds is a Veo 2 duration; Veo 3 rejects it
        let mut params = valid_params();
        params.model = "veo-2".to_string();
        params.duration_seconds = Some(5);
        assert!(params.validate().is_ok());

        params.model = "veo-3".to_string();
        let errors = params.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "duration_seconds"));
    }

    #[test]
    fn test_omitted_duration_is_accepted() {
        let mut params = valid_params();
        params.duration_seconds = None;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_unsupported_resolution() {
        let mut params = valid_params();
        params.model = "veo-2".to_string();
        params.resolution = Some("1080p".to_string());
        let errors = params.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "resolution"));
    }

    #[test]
    fn test_invalid_person_generation() {
        let mut params = valid_params();
        params.person_generation = "everyone".to_string();
        let errors = params.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "person_generation"));
    }

    #[test]
    fn test_person_generation_allow_all_rejected_on_veo3() {
        let mut params = valid_params();
        params.person_generation = "allow_all".to_string();
        let errors = params.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "person_generation"));

        params.model = "veo-2".to_string();
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validation_collects_multiple_errors() {
        let params = VideoGenerateParams {
            prompt: "   ".to_string(),
            model: "veo-3".to_string(),
            aspect_ratio: "square".to_string(),
            duration_seconds: Some(99),
            resolution: Some("4k".to_string()),
            person_generation: "everyone".to_string(),
            negative_prompt: None,
            image: None,
        };
        let errors = params.validate().unwrap_err();
        assert!(errors.len() >= 4, "Expected at least 4 errors, got {}", errors.len());
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError {
            field: "prompt".to_string(),
            message: "cannot be empty".to_string(),
        };
        assert_eq!(format!("{}", error), "prompt: cannot be empty");
    }

    #[test]
    fn test_resolved_model_follows_alias() {
        let params = valid_params();
        assert_eq!(params.resolved_model().unwrap().id, "veo-3.0-generate-001");
    }

    #[test]
    fn test_request_serializes_with_camel_case_keys() {
        let request = GenerateVideoRequest {
            instances: vec![VideoInstance {
                prompt: "A cat".to_string(),
                image: Some(ImageInput {
                    bytes_base64_encoded: "aGVsbG8=".to_string(),
                    mime_type: "image/png".to_string(),
                }),
            }],
            parameters: VideoParameters {
                aspect_ratio: "16:9".to_string(),
                duration_seconds: 8,
                resolution: Some("720p".to_string()),
                person_generation: "allow_adult".to_string(),
                negative_prompt: Some("rain".to_string()),
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        let parameters = &value["parameters"];
        assert_eq!(parameters["aspectRatio"], "16:9");
        assert_eq!(parameters["durationSeconds"], 8);
        assert_eq!(parameters["resolution"], "720p");
        assert_eq!(parameters["personGeneration"], "allow_adult");
        assert_eq!(parameters["negativePrompt"], "rain");
        let image = &value["instances"][0]["image"];
        assert_eq!(image["bytesBase64Encoded"], "aGVsbG8=");
        assert_eq!(image["mimeType"], "image/png");
    }

    #[test]
    fn test_optional_fields_are_omitted_from_the_wire() {
        let request = GenerateVideoRequest {
            instances: vec![VideoInstance {
                prompt: "A cat".to_string(),
                image: None,
            }],
            parameters: VideoParameters {
                aspect_ratio: "16:9".to_string(),
                duration_seconds: 8,
                resolution: None,
                person_generation: "allow_adult".to_string(),
                negative_prompt: None,
            },
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("image"));
        assert!(!json.contains("resolution"));
        assert!(!json.contains("negativePrompt"));
    }

    #[test]
    fn test_mime_type_for_path() {
        assert_eq!(VideoHandler::mime_type_for_path("a.jpg"), "image/jpeg");
        assert_eq!(VideoHandler::mime_type_for_path("a.JPEG"), "image/jpeg");
        assert_eq!(VideoHandler::mime_type_for_path("a.webp"), "image/webp");
        assert_eq!(VideoHandler::mime_type_for_path("a.png"), "image/png");
        assert_eq!(VideoHandler::mime_type_for_path("noext"), "image/png");
    }

    #[test]
    fn test_has_image_extension() {
        assert!(VideoHandler::has_image_extension("frame.png"));
        assert!(VideoHandler::has_image_extension("photo.JPG"));
        assert!(!VideoHandler::has_image_extension("video.mp4"));
        assert!(!VideoHandler::has_image_extension("aGVsbG8="));
    }
}
