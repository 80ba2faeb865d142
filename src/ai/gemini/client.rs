//! Gemini API Client
//!
//! Sends one image plus the reverse-prompt instruction to
//! `generateContent` and validates the structured reply:
//! - at most one network attempt per call, no retry
//! - missing key fails before the transport is touched
//! - token usage tracking

use super::transport::{GenerateTransport, HttpTransport};
use super::types::*;
use crate::ai::json_parser::extract_json_object;
use crate::ai::prompts::REVERSE_PROMPT_INSTRUCTION;
use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicU32, Ordering};

/// Anything that can turn an encoded image into an [`AnalysisResult`]
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        base64_payload: &str,
        mime_type: &str,
    ) -> Result<AnalysisResult, AnalysisError>;
}

/// Gemini client with token usage tracking
pub struct GeminiClient<T = HttpTransport> {
    config: AnalyzerConfig,
    transport: T,
    tokens_used: AtomicU32,
}

impl GeminiClient<HttpTransport> {
    /// Create a client over the shared HTTP connection pool
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }
}

impl<T: GenerateTransport> GeminiClient<T> {
    pub fn with_transport(config: AnalyzerConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            tokens_used: AtomicU32::new(0),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Total tokens reported by the service across calls
    pub fn tokens_used(&self) -> u32 {
        self.tokens_used.load(Ordering::Relaxed)
    }

    /// Analyze a base64-encoded image
    pub async fn analyze_image(
        &self,
        base64_payload: &str,
        mime_type: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AnalysisError::Auth("API key not found".to_string()))?;

        let request = build_request(base64_payload, mime_type);
        let endpoint = self.config.endpoint();

        tracing::debug!(
            model = %self.config.model,
            mime = mime_type,
            payload_len = base64_payload.len(),
            "Sending generateContent request"
        );

        let call = self.transport.generate(&endpoint, api_key, &request);
        let response = match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                AnalysisError::network(format!("Request timed out after {:?}", limit))
            })??,
            None => call.await?,
        };

        if let Some(usage) = &response.usage_metadata {
            self.tokens_used
                .fetch_add(usage.total_token_count, Ordering::Relaxed);
            tracing::info!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "Gemini analysis complete"
            );
        }

        let text = response.text().ok_or_else(|| AnalysisError::EmptyResponse {
            reason: response.empty_reason(),
        })?;

        parse_analysis(&text)
    }
}

#[async_trait]
impl<T: GenerateTransport> ImageAnalyzer for GeminiClient<T> {
    async fn analyze(
        &self,
        base64_payload: &str,
        mime_type: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.analyze_image(base64_payload, mime_type).await
    }
}

/// Build the single-turn request: image part, instruction, response schema
pub fn build_request(base64_payload: &str, mime_type: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: mime_type.to_string(),
                        data: base64_payload.to_string(),
                    },
                },
                Part::Text {
                    text: REVERSE_PROMPT_INSTRUCTION.to_string(),
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: Schema::analysis_result(),
        },
    }
}

/// Parse and validate the model's JSON text.
///
/// Unknown fields are ignored. Blank `prompt`/`style` are rejected; blank
/// elements are dropped.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    #[derive(Deserialize)]
    struct RawAnalysis {
        prompt: String,
        elements: Vec<String>,
        style: String,
    }

    // Bare JSON first; fence and prose stripping only when that fails
    let raw: RawAnalysis = match serde_json::from_str(text.trim()) {
        Ok(raw) => raw,
        Err(bare_err) => {
            let json_str = extract_json_object(text).ok_or_else(|| {
                AnalysisError::Schema(format!("Failed to parse JSON: {}", bare_err))
            })?;
            serde_json::from_str(json_str)
                .map_err(|e| AnalysisError::Schema(format!("Failed to parse JSON: {}", e)))?
        }
    };

    let prompt = raw.prompt.trim();
    if prompt.is_empty() {
        return Err(AnalysisError::Schema("`prompt` is empty".to_string()));
    }

    let style = raw.style.trim();
    if style.is_empty() {
        return Err(AnalysisError::Schema("`style` is empty".to_string()));
    }

    let elements = raw
        .elements
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect();

    Ok(AnalysisResult {
        prompt: prompt.to_string(),
        elements,
        style: style.to_string(),
    })
}
