//! Session states, events and the effects a transition asks the host to run

use crate::ai::{AnalysisResult, ImageAnalyzer};
use crate::error::AnalysisError;
use crate::services::ingest::ImageAsset;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Exactly one of these is active per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Idle,
    Analyzing,
    Success,
    Error,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Analyzing => "analyzing",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to [`SessionController::dispatch`](super::SessionController::dispatch)
#[derive(Debug)]
pub enum SessionEvent {
    /// A new image replaces whatever was selected
    SelectImage(ImageAsset),
    /// Drop the image, result and error
    Clear,
    /// Start (or restart) analysis of the current image
    Analyze,
    /// An analysis request finished
    Completed {
        generation: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    },
}

/// Why an event did not change anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoImage,
    AlreadyAnalyzing,
    /// Completion for a selection or request that is no longer current
    Stale,
}

/// Work the host must do after a transition
#[derive(Debug)]
pub enum Effect {
    None,
    Analyze(AnalysisRequest),
    Ignored(IgnoreReason),
}

/// A pending analysis, tagged with the generation it belongs to
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub generation: u64,
    pub image: Arc<ImageAsset>,
}

impl AnalysisRequest {
    /// Run the analyzer and wrap the outcome as a completion event
    pub async fn run(&self, analyzer: &dyn ImageAnalyzer) -> SessionEvent {
        let outcome = analyzer
            .analyze(self.image.base64_payload(), self.image.mime_type())
            .await;
        SessionEvent::Completed {
            generation: self.generation,
            outcome,
        }
    }
}

/// Image facts exposed to rendering surfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub name: Option<String>,
    pub mime_type: String,
    pub byte_len: usize,
}

impl From<&ImageAsset> for ImageSummary {
    fn from(asset: &ImageAsset) -> Self {
        Self {
            name: asset.source_name().map(str::to_string),
            mime_type: asset.mime_type().to_string(),
            byte_len: asset.byte_len(),
        }
    }
}

/// Read-only view of a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub state: SessionState,
    pub image: Option<ImageSummary>,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
}
