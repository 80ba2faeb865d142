//! Session controller
//!
//! Owns the current image, result and error for one session and moves
//! between `Idle → Analyzing → Success | Error`. Every selection and every
//! started request gets a fresh generation; completions carrying an old
//! generation are dropped, so a slow response can never overwrite a newer
//! selection.

use super::state::*;
use crate::ai::{AnalysisResult, ImageAnalyzer};
use crate::error::AnalysisError;
use crate::services::ingest::ImageAsset;
use std::sync::Arc;
use uuid::Uuid;

pub struct SessionController {
    id: Uuid,
    state: SessionState,
    image: Option<Arc<ImageAsset>>,
    result: Option<AnalysisResult>,
    error: Option<String>,
    generation: u64,
    /// Generation of the request currently awaited, if any
    in_flight: Option<u64>,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            image: None,
            result: None,
            error: None,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn image(&self) -> Option<&ImageAsset> {
        self.image.as_deref()
    }

    /// Current result; only present in `Success`
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Current error message; only present in `Error`
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            state: self.state,
            image: self.image.as_deref().map(ImageSummary::from),
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }

    /// Apply one event and report what the host must do next
    pub fn dispatch(&mut self, event: SessionEvent) -> Effect {
        match event {
            SessionEvent::SelectImage(asset) => {
                tracing::debug!(session = %self.id, image = ?asset, "Image selected");
                self.reset(Some(Arc::new(asset)));
                Effect::None
            }
            SessionEvent::Clear => {
                tracing::debug!(session = %self.id, "Session cleared");
                self.reset(None);
                Effect::None
            }
            SessionEvent::Analyze => self.start_analysis(),
            SessionEvent::Completed {
                generation,
                outcome,
            } => self.complete(generation, outcome),
        }
    }

    pub fn select_image(&mut self, asset: ImageAsset) {
        self.dispatch(SessionEvent::SelectImage(asset));
    }

    pub fn clear(&mut self) {
        self.dispatch(SessionEvent::Clear);
    }

    /// Analyze the current image and wait for the outcome.
    ///
    /// Returns the state after completion, or the unchanged state when the
    /// request was not started.
    pub async fn run_analysis(&mut self, analyzer: &dyn ImageAnalyzer) -> SessionState {
        let request = match self.dispatch(SessionEvent::Analyze) {
            Effect::Analyze(request) => request,
            _ => return self.state,
        };

        let completion = request.run(analyzer).await;
        self.dispatch(completion);
        self.state
    }

    fn reset(&mut self, image: Option<Arc<ImageAsset>>) {
        self.image = image;
        self.result = None;
        self.error = None;
        self.in_flight = None;
        self.generation += 1;
        self.state = SessionState::Idle;
    }

    fn start_analysis(&mut self) -> Effect {
        if self.state == SessionState::Analyzing {
            tracing::debug!(session = %self.id, "Analysis already in flight");
            return Effect::Ignored(IgnoreReason::AlreadyAnalyzing);
        }

        let image = match &self.image {
            Some(image) => Arc::clone(image),
            None => return Effect::Ignored(IgnoreReason::NoImage),
        };

        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.result = None;
        self.error = None;
        self.state = SessionState::Analyzing;

        tracing::info!(
            session = %self.id,
            generation = self.generation,
            mime = image.mime_type(),
            bytes = image.byte_len(),
            "Analysis started"
        );

        Effect::Analyze(AnalysisRequest {
            generation: self.generation,
            image,
        })
    }

    fn complete(
        &mut self,
        generation: u64,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> Effect {
        if self.state != SessionState::Analyzing || self.in_flight != Some(generation) {
            tracing::debug!(
                session = %self.id,
                generation,
                current = self.generation,
                "Discarding stale analysis response"
            );
            return Effect::Ignored(IgnoreReason::Stale);
        }

        self.in_flight = None;
        match outcome {
            Ok(result) => {
                tracing::info!(
                    session = %self.id,
                    generation,
                    elements = result.elements.len(),
                    "Analysis succeeded"
                );
                self.result = Some(result);
                self.state = SessionState::Success;
            }
            Err(e) => {
                tracing::warn!(session = %self.id, generation, kind = e.kind(), "Analysis failed: {}", e);
                self.error = Some(e.user_message());
                self.state = SessionState::Error;
            }
        }
        Effect::None
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
