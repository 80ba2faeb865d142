pub mod ai;
pub mod commands;
pub mod config;
pub mod error;
pub mod services;
pub mod session;

pub use ai::{AnalysisResult, GeminiClient, ImageAnalyzer};
pub use config::AnalyzerConfig;
pub use error::{AnalysisError, CredentialError, IngestError};
pub use services::ingest::ImageAsset;
pub use session::{Effect, SessionController, SessionEvent, SessionSnapshot, SessionState};

use tracing_subscriber::EnvFilter;

/// Initialize tracing with RUST_LOG env filter
///
/// Default: warn for dependencies, info for this crate. Logs go to stderr
/// so stdout stays clean for the generated prompt.
/// Use RUST_LOG=prompt_lens=debug for per-request logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,prompt_lens=info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
