//! MCP server implementation for the Veo video server.
//!
//! This module provides the MCP server handler that exposes:
//! - `video_generate` tool for submitting a generation job
//! - `video_operation_status` tool for a single status check
//! - `video_wait` tool for polling an operation until it finishes
//! - Resources for models and providers

use crate::handler::{VideoGenerateParams, VideoHandler};
use crate::operation::{OperationError, OperationName, OperationSnapshot, OperationStatus};
use crate::poller::{
    WaitOptions, WaitOutcome, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS,
};
use crate::resources;
use rmcp::{
    model::{
        CallToolResult, Content, ListResourcesResult, ReadResourceResult,
        ResourceContents, ServerCapabilities, ServerInfo,
    },
    ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info};
use veo_mcp_common::config::Config;
use veo_mcp_common::error::Error;

/// MCP server for asynchronous video generation.
#[derive(Clone)]
pub struct VideoServer {
    /// Handler for submission and status fetches
    handler: Arc<VideoHandler>,
}

/// Tool parameters for video_generate.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct VideoGenerateToolParams {
    /// Text prompt describing the video to generate
    pub prompt: String,
    /// Model to use for generation (default: veo-3.0-generate-001)
    #[serde(default)]
    pub model: Option<String>,
    /// Aspect ratio (16:9, 9:16)
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    /// Duration in seconds (model-dependent; defaults to the model's own)
    #[serde(default)]
    pub duration_seconds: Option<u8>,
    /// Output resolution (720p, 1080p where supported)
    #[serde(default)]
    pub resolution: Option<String>,
    /// Person-generation policy (dont_allow, allow_adult, allow_all)
    #[serde(default)]
    pub person_generation: Option<String>,
    /// Text describing what the video should not contain
    #[serde(default)]
    pub negative_prompt: Option<String>,
    /// Source image for image-to-video (base64 data or local file path)
    #[serde(default)]
    pub image: Option<String>,
}

impl From<VideoGenerateToolParams> for VideoGenerateParams {
    fn from(params: VideoGenerateToolParams) -> Self {
        Self {
            prompt: params.prompt,
            model: params
                .model
                .unwrap_or_else(|| veo_mcp_common::models::DEFAULT_MODEL.to_string()),
            aspect_ratio: params
                .aspect_ratio
                .unwrap_or_else(|| crate::handler::DEFAULT_ASPECT_RATIO.to_string()),
            duration_seconds: params.duration_seconds,
            resolution: params.resolution,
            person_generation: params
                .person_generation
                .unwrap_or_else(|| crate::handler::DEFAULT_PERSON_GENERATION.to_string()),
            negative_prompt: params.negative_prompt,
            image: params.image,
        }
    }
}

/// Tool parameters for video_operation_status.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct OperationStatusToolParams {
    /// Operation identifier: a bare token or a fully qualified name
    pub operation_name: String,
}

/// Tool parameters for video_wait.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct VideoWaitToolParams {
    /// Operation identifier: a bare token or a fully qualified name
    pub operation_name: String,
    /// Seconds between status checks (5-60, default 10)
    #[serde(default)]
    pub poll_interval_seconds: Option<u64>,
    /// Overall wait budget in seconds (30-600, default 300)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl VideoServer {
    /// Create a new VideoServer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            handler: Arc::new(VideoHandler::new(config)),
        }
    }

    /// Submit a video generation job and return its operation name.
    pub async fn generate_video(
        &self,
        params: VideoGenerateToolParams,
    ) -> Result<CallToolResult, McpError> {
        info!(prompt = %params.prompt, "Submitting video generation");

        let gen_params: VideoGenerateParams = params.into();
        let name = self.handler.submit(gen_params).await.map_err(map_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            format_submission(&name),
        )]))
    }

    /// Fetch and classify the current state of an operation.
    pub async fn operation_status(
        &self,
        params: OperationStatusToolParams,
    ) -> Result<CallToolResult, McpError> {
        let name = OperationName::parse(&params.operation_name)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let snapshot = self.handler.fetch_operation(&name).await.map_err(map_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            format_snapshot(&name, &snapshot),
        )]))
    }

    /// Poll an operation until it finishes, fails, or the deadline elapses.
    pub async fn wait_for_video(
        &self,
        params: VideoWaitToolParams,
    ) -> Result<CallToolResult, McpError> {
        let name = OperationName::parse(&params.operation_name)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let options = WaitOptions::new(
            params.poll_interval_seconds.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            params.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        info!(operation = %name, "Waiting for video operation");

        let outcome = self.handler.wait(&name, options).await.map_err(map_error)?;

        Ok(CallToolResult::success(vec![Content::text(
            format_outcome(&name, &outcome),
        )]))
    }
}

/// Map a handler error onto the MCP error surface.
fn map_error(error: Error) -> McpError {
    match error {
        Error::Validation(_) => McpError::invalid_params(error.to_string(), None),
        _ => McpError::internal_error(error.to_string(), None),
    }
}

/// Render the result of a submission.
fn format_submission(name: &OperationName) -> String {
    format!(
        "Video generation started.\nOperation: {}\n\
         Check progress with video_operation_status, or block until it \
         finishes with video_wait.",
        name
    )
}

/// Render a classified snapshot as text.
fn format_snapshot(name: &OperationName, snapshot: &OperationSnapshot) -> String {
    match snapshot.status() {
        OperationStatus::InProgress => format!(
            "Operation {} is still running. Check again shortly.",
            name
        ),
        OperationStatus::Completed => {
            format_artifacts("Video generation complete.", &snapshot.artifact_uris())
        }
        OperationStatus::Failed => format_operation_failure(snapshot.error.as_ref()),
    }
}

/// Render a wait outcome as text. The timeout rendering is distinct from a
/// failure: the remote job is still running and the operation name stays
/// usable.
fn format_outcome(name: &OperationName, outcome: &WaitOutcome) -> String {
    match outcome {
        WaitOutcome::Completed { artifacts, elapsed, polls } => format!(
            "{}\nPolled {} time(s) over {}s.",
            format_artifacts("Video generation complete.", artifacts),
            polls,
            elapsed.as_secs()
        ),
        WaitOutcome::Failed { error, elapsed, polls } => format!(
            "{}\nPolled {} time(s) over {}s.",
            format_operation_failure(Some(error)),
            polls,
            elapsed.as_secs()
        ),
        WaitOutcome::TimedOut { elapsed, polls } => format!(
            "Timed out after {}s ({} poll(s)) with the operation still \
             running remotely. Check it later with video_operation_status \
             using operation name {}.",
            elapsed.as_secs(),
            polls,
            name
        ),
    }
}

/// Render a completion lead followed by the artifact list.
fn format_artifacts(lead: &str, artifacts: &[String]) -> String {
    if artifacts.is_empty() {
        return format!("{} The service returned no artifacts.", lead);
    }
    let mut message = lead.to_string();
    for uri in artifacts {
        message.push_str(&format!("\nVideo: {}", uri));
    }
    message
}

/// Render a remote operation failure with its code, message, and hint.
fn format_operation_failure(error: Option<&OperationError>) -> String {
    let code = error.and_then(|e| e.code).unwrap_or(2);
    let message = error
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| "Unknown error".to_string());
    Error::remote_operation(code, message).to_string()
}

impl ServerHandler for VideoServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Video generation server backed by the Gemini API Veo models. \
                 Use video_generate to start a job (it returns an operation \
                 name immediately), video_operation_status for a single \
                 progress check, and video_wait to poll until the job \
                 finishes or a timeout elapses."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_
    {
        async move {
            use rmcp::model::{ListToolsResult, Tool};
            use schemars::schema_for;

            // video_generate tool
            let generate_schema = schema_for!(VideoGenerateToolParams);
            let generate_schema_value = serde_json::to_value(&generate_schema).unwrap_or_default();
            let generate_input_schema = match generate_schema_value {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

            // video_operation_status tool
            let status_schema = schema_for!(OperationStatusToolParams);
            let status_schema_value = serde_json::to_value(&status_schema).unwrap_or_default();
            let status_input_schema = match status_schema_value {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

            // video_wait tool
            let wait_schema = schema_for!(VideoWaitToolParams);
            let wait_schema_value = serde_json::to_value(&wait_schema).unwrap_or_default();
            let wait_input_schema = match wait_schema_value {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

            Ok(ListToolsResult {
                tools: vec![
                    Tool {
                        name: Cow::Borrowed("video_generate"),
                        description: Some(Cow::Borrowed(
                            "Start video generation from a text prompt (optionally with a \
                             source image) using the Gemini API Veo models. Returns the \
                             operation name immediately; the job keeps running remotely.",
                        )),
                        input_schema: generate_input_schema,
                        annotations: None,
                        icons: None,
                        meta: None,
                        output_schema: None,
                        title: None,
                    },
                    Tool {
                        name: Cow::Borrowed("video_operation_status"),
                        description: Some(Cow::Borrowed(
                            "Check a video generation operation once. Accepts a bare \
                             operation token or a fully qualified operation name and reports \
                             whether the job is running, finished with video URIs, or failed.",
                        )),
                        input_schema: status_input_schema,
                        annotations: None,
                        icons: None,
                        meta: None,
                        output_schema: None,
                        title: None,
                    },
                    Tool {
                        name: Cow::Borrowed("video_wait"),
                        description: Some(Cow::Borrowed(
                            "Poll a video generation operation at a fixed interval until it \
                             finishes, fails, or the timeout elapses. A timeout leaves the \
                             job running remotely; check it again later with the same \
                             operation name.",
                        )),
                        input_schema: wait_input_schema,
                        annotations: None,
                        icons: None,
                        meta: None,
                        output_schema: None,
                        title: None,
                    },
                ],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            match params.name.as_ref() {
                "video_generate" => {
                    let tool_params: VideoGenerateToolParams = params
                        .arguments
                        .map(|args| serde_json::from_value(serde_json::Value::Object(args)))
                        .transpose()
                        .map_err(|e| {
                            McpError::invalid_params(format!("Invalid parameters: {}", e), None)
                        })?
                        .ok_or_else(|| McpError::invalid_params("Missing parameters", None))?;

                    self.generate_video(tool_params).await
                }
                "video_operation_status" => {
                    let tool_params: OperationStatusToolParams = params
                        .arguments
                        .map(|args| serde_json::from_value(serde_json::Value::Object(args)))
                        .transpose()
                        .map_err(|e| {
                            McpError::invalid_params(format!("Invalid parameters: {}", e), None)
                        })?
                        .ok_or_else(|| McpError::invalid_params("Missing parameters", None))?;

                    self.operation_status(tool_params).await
                }
                "video_wait" => {
                    let tool_params: VideoWaitToolParams = params
                        .arguments
                        .map(|args| serde_json::from_value(serde_json::Value::Object(args)))
                        .transpose()
                        .map_err(|e| {
                            McpError::invalid_params(format!("Invalid parameters: {}", e), None)
                        })?
                        .ok_or_else(|| McpError::invalid_params("Missing parameters", None))?;

                    self.wait_for_video(tool_params).await
                }
                _ => Err(McpError::invalid_params(
                    format!("Unknown tool: {}", params.name),
                    None,
                )),
            }
        }
    }

    fn list_resources(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            debug!("Listing resources");

            let models_resource = rmcp::model::Resource {
                raw: rmcp::model::RawResource {
                    uri: "video://models".to_string(),
                    name: "Available Video Models".to_string(),
                    title: None,
                    description: Some("List of available video generation models".to_string()),
                    mime_type: Some("application/json".to_string()),
                    size: None,
                    icons: None,
                    meta: None,
                },
                annotations: None,
            };

            let providers_resource = rmcp::model::Resource {
                raw: rmcp::model::RawResource {
                    uri: "video://providers".to_string(),
                    name: "Available Providers".to_string(),
                    title: None,
                    description: Some("List of available video generation providers".to_string()),
                    mime_type: Some("application/json".to_string()),
                    size: None,
                    icons: None,
                    meta: None,
                },
                annotations: None,
            };

            Ok(ListResourcesResult {
                resources: vec![models_resource, providers_resource],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn read_resource(
        &self,
        params: rmcp::model::ReadResourceRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            let uri = &params.uri;
            debug!(uri = %uri, "Reading resource");

            let content = match uri.as_str() {
                "video://models" => resources::models_resource_json(),
                "video://providers" => resources::providers_resource_json(),
                _ => {
                    return Err(McpError::resource_not_found(
                        format!("Unknown resource: {}", uri),
                        None,
                    ));
                }
            };

            Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(content, uri.clone())],
            })
        }
    }
}
