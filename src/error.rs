//! Error types for ingestion, analysis and credential storage.

use thiserror::Error;

/// Fallback shown to the user when a failure carries no usable text.
pub const GENERIC_ANALYSIS_FAILURE: &str = "Failed to analyze image. Please try again.";

/// Errors produced while turning user input into an [`ImageAsset`](crate::ImageAsset).
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input was rejected before any bytes were kept.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a single analysis call.
///
/// Network and schema problems are kept apart so hosts can word them
/// differently.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing, blank or rejected API key.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Transport failure or non-success HTTP status.
    #[error("Network error: {message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// The service answered without any text.
    #[error("No response from Gemini{}", reason_suffix(.reason))]
    EmptyResponse { reason: Option<String> },

    /// Text came back but is not the JSON shape we asked for.
    #[error("Malformed analysis response: {0}")]
    Schema(String),
}

impl AnalysisError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            status: None,
            message: message.into(),
        }
    }

    /// Short machine-friendly label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Network { .. } => "network",
            Self::EmptyResponse { .. } => "empty_response",
            Self::Schema(_) => "schema",
        }
    }

    /// Message suitable for the session's error state.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Auth(detail) if detail.trim().is_empty() => {
                "API key not found".to_string()
            }
            Self::Auth(detail) if detail.to_lowercase().contains("api key") => {
                detail.trim().to_string()
            }
            Self::Auth(detail) => format!("API key problem: {}", detail.trim()),
            Self::Network { status: Some(code), message } => {
                format!("Gemini request failed ({}): {}", code, message.trim())
            }
            Self::Network { status: None, message } => {
                format!("Could not reach Gemini: {}", message.trim())
            }
            Self::EmptyResponse { .. } => self.to_string(),
            Self::Schema(detail) => format!(
                "Gemini returned a response that could not be read as a prompt: {}",
                detail.trim()
            ),
        };

        if message.trim().is_empty() {
            GENERIC_ANALYSIS_FAILURE.to_string()
        } else {
            message
        }
    }
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(" ({})", r),
        None => String::new(),
    }
}

/// Errors from the OS keychain store.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("API key not found")]
    NotFound,

    #[error("Secure credential storage unavailable: {0}")]
    Unavailable(String),

    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),
}
