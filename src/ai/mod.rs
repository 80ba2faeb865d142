pub mod credentials;
pub mod gemini;
pub mod http_client;
pub mod json_parser;
pub mod prompts;

pub use credentials::*;
pub use gemini::{AnalysisResult, GeminiClient, GenerateTransport, HttpTransport, ImageAnalyzer};
