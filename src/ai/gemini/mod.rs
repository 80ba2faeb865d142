//! Gemini structured-output analysis
//!
//! ```text
//! ImageAsset ──base64 + mime──▶ GeminiClient ──generateContent──▶ Gemini
//!                                    │
//!                               JSON text ──parse_analysis──▶ AnalysisResult
//! ```

mod client;
mod transport;

pub mod types;

pub use client::{build_request, parse_analysis, GeminiClient, ImageAnalyzer};
pub use transport::{classify_failure, GenerateTransport, HttpTransport};
pub use types::AnalysisResult;
