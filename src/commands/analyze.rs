//! Analyze command
//!
//! Resolves configuration, ingests one image, runs a session through a
//! single analysis and returns the final snapshot.

use crate::ai::GeminiClient;
use crate::config::AnalyzerConfig;
use crate::services::ingest::{
    ingest_bytes, ingest_data_uri, ingest_file, sniff_mime, ImageAsset, MAX_INLINE_BYTES,
};
use crate::session::{SessionController, SessionSnapshot, SessionState};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Where the image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `-`: raw bytes on stdin, type sniffed from content
    Stdin,
    /// `data:image/...;base64,...`
    DataUri(String),
    File(std::path::PathBuf),
}

impl ImageSource {
    pub fn parse(input: &str) -> Self {
        if input == "-" {
            Self::Stdin
        } else if input.trim_start().starts_with("data:") {
            Self::DataUri(input.to_string())
        } else {
            Self::File(Path::new(input).to_path_buf())
        }
    }
}

/// Overrides applied on top of the environment configuration
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl AnalyzeOptions {
    pub fn apply(&self, mut config: AnalyzerConfig) -> AnalyzerConfig {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            config = config.with_api_key(key.trim());
        }
        if let Some(model) = self.model.as_deref().filter(|m| !m.trim().is_empty()) {
            config = config.with_model(model.trim());
        }
        if let Some(secs) = self.timeout_secs.filter(|s| *s > 0) {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        config
    }
}

/// Load an image from any supported source
pub async fn load_image(source: &ImageSource) -> Result<ImageAsset, String> {
    let asset = match source {
        ImageSource::File(path) => ingest_file(path).await,
        ImageSource::DataUri(uri) => ingest_data_uri(uri),
        ImageSource::Stdin => {
            let bytes = read_capped(tokio::io::stdin())
                .await
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            let mime = sniff_mime(&bytes).unwrap_or("application/octet-stream");
            ingest_bytes(bytes, mime, Some("stdin".to_string()))
        }
    };

    asset.map_err(|e| e.to_string())
}

/// Read at most one byte past the inline limit so oversized input is
/// rejected by the size check without buffering all of it.
async fn read_capped<R: AsyncRead + Unpin>(reader: R) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(MAX_INLINE_BYTES as u64 + 1)
        .read_to_end(&mut bytes)
        .await?;
    Ok(bytes)
}

/// Analyze one image end to end.
///
/// Returns the final snapshot on success and the session's error message
/// otherwise.
pub async fn analyze_image(
    source: &ImageSource,
    options: &AnalyzeOptions,
) -> Result<SessionSnapshot, String> {
    let config = options.apply(AnalyzerConfig::from_env());
    tracing::debug!(?config, "Resolved analyzer configuration");

    let asset = load_image(source).await?;
    let client = GeminiClient::new(config);

    let mut session = SessionController::new();
    session.select_image(asset);

    match session.run_analysis(&client).await {
        SessionState::Success => Ok(session.snapshot()),
        _ => Err(session
            .error()
            .unwrap_or(crate::error::GENERIC_ANALYSIS_FAILURE)
            .to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_source_parse() {
        assert_eq!(ImageSource::parse("-"), ImageSource::Stdin);
        assert!(matches!(
            ImageSource::parse("data:image/png;base64,AAAA"),
            ImageSource::DataUri(_)
        ));
        assert_eq!(
            ImageSource::parse("shots/cat.png"),
            ImageSource::File("shots/cat.png".into())
        );
    }

    #[test]
    fn test_options_override_config() {
        let options = AnalyzeOptions {
            api_key: Some(" cli-key ".into()),
            model: Some("gemini-2.5-pro".into()),
            timeout_secs: Some(45),
        };
        let config = options.apply(AnalyzerConfig::default().with_api_key("env-key"));

        assert_eq!(config.api_key.as_deref(), Some("cli-key"));
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_blank_options_keep_config() {
        let options = AnalyzeOptions {
            api_key: Some("".into()),
            model: None,
            timeout_secs: Some(0),
        };
        let config = options.apply(AnalyzerConfig::default().with_api_key("env-key"));

        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(config.request_timeout.is_none());
    }

    #[tokio::test]
    async fn test_read_capped_stops_past_limit() {
        let oversized = vec![0u8; MAX_INLINE_BYTES + 4096];
        let bytes = read_capped(oversized.as_slice()).await.unwrap();
        assert_eq!(bytes.len(), MAX_INLINE_BYTES + 1);

        let err = ingest_bytes(bytes, "image/png", None).unwrap_err();
        assert!(err.to_string().contains("limit is 20 MB"), "{}", err);
    }

    #[tokio::test]
    async fn test_read_capped_keeps_small_input() {
        let bytes = read_capped(&b"\x89PNG"[..]).await.unwrap();
        assert_eq!(bytes, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_load_image_rejects_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readme.md");
        std::fs::write(&path, "# hi").unwrap();

        let err = load_image(&ImageSource::File(path)).await.unwrap_err();
        assert!(err.contains("not an image"));
    }
}
