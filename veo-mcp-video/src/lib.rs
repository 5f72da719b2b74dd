//! Veo MCP Video Server Library
//!
//! This library exposes the Gemini API Veo video-generation models as MCP
//! tools with an asynchronous submit / status / wait workflow.

pub mod handler;
pub mod operation;
pub mod poller;
pub mod resources;
pub mod server;

pub use handler::{VideoGenerateParams, VideoHandler};
pub use operation::{OperationName, OperationSnapshot, OperationStatus};
pub use poller::{StatusSource, WaitOptions, WaitOutcome};
pub use server::VideoServer;
