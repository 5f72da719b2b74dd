//! Operation value types, identifier normalization, and result
//! classification.
//!
//! The upstream job handle is a plain name string; `OperationName` wraps it
//! as a value type with no lifecycle duties. `OperationSnapshot` is the
//! deserialized remote state of one operation, refreshed only by re-fetching.

use serde::{Deserialize, Serialize};
use std::fmt;
use veo_mcp_common::error::Error;

/// Canonical resource collection for bare operation tokens.
pub const OPERATIONS_COLLECTION: &str = "operations";

/// A normalized operation identifier.
///
/// Callers may supply either a bare token (e.g. `abc123`) or a fully
/// qualified path (e.g. `models/veo-3.0-generate-001/operations/abc123`).
/// Construction applies the normalization rule once; the resulting value is
/// used verbatim as the remote lookup key by both the status fetch and the
/// wait loop.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationName(String);

impl OperationName {
    /// Parse and normalize a caller-supplied operation identifier.
    ///
    /// An identifier containing a path separator is used verbatim; a bare
    /// token is prefixed with the `operations/` collection. Normalization is
    /// idempotent.
    ///
    /// # Errors
    /// Returns `Error::Validation` for an empty or blank identifier.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("Operation name cannot be empty"));
        }
        if trimmed.contains('/') {
            Ok(Self(trimmed.to_string()))
        } else {
            Ok(Self(format!("{}/{}", OPERATIONS_COLLECTION, trimmed)))
        }
    }

    /// The normalized name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification of an operation snapshot.
///
/// Every snapshot falls into exactly one class. `Completed` and `Failed` are
/// terminal; no further transitions occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    /// No done flag and no error: the job is still running remotely.
    InProgress,
    /// Done without an error.
    Completed,
    /// An error is present, regardless of the done flag.
    Failed,
}

/// Error reported by the remote service for a failed operation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OperationError {
    /// Status code reported by the service
    pub code: Option<i32>,
    /// Error message reported by the service
    pub message: Option<String>,
}

/// Current state of a long-running operation, as returned by the service.
///
/// Never mutated locally; a fresh snapshot is obtained by re-fetching.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationSnapshot {
    /// Fully qualified operation name
    pub name: Option<String>,
    /// Whether the operation has reached a terminal state (absent until then)
    pub done: Option<bool>,
    /// Error if the operation failed
    pub error: Option<OperationError>,
    /// Response payload if the operation succeeded
    pub response: Option<OperationResponse>,
}

/// Response payload of a completed operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    /// Video generation results
    pub generate_video_response: Option<GenerateVideoResponse>,
}

/// Video generation results within a completed operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    /// Generated samples, each carrying one video artifact
    pub generated_samples: Option<Vec<GeneratedSample>>,
    /// Count of samples filtered by safety policies
    #[serde(default)]
    pub rai_media_filtered_count: Option<i32>,
}

/// One generated sample.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSample {
    /// The produced video
    pub video: Option<VideoArtifact>,
}

/// Locator for a produced video artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoArtifact {
    /// URI where the video can be retrieved
    pub uri: Option<String>,
}

impl OperationSnapshot {
    /// Classify this snapshot.
    ///
    /// An error always classifies as `Failed`, even alongside `done = true`.
    pub fn status(&self) -> OperationStatus {
        if self.error.is_some() {
            OperationStatus::Failed
        } else if self.done.unwrap_or(false) {
            OperationStatus::Completed
        } else {
            OperationStatus::InProgress
        }
    }

    /// Extract the artifact URIs carried by this snapshot.
    ///
    /// Absent response layers yield an empty list, never a null.
    pub fn artifact_uris(&self) -> Vec<String> {
        self.response
            .as_ref()
            .and_then(|r| r.generate_video_response.as_ref())
            .and_then(|g| g.generated_samples.as_ref())
            .map(|samples| {
                samples
                    .iter()
                    .filter_map(|s| s.video.as_ref())
                    .filter_map(|v| v.uri.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}
