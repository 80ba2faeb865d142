//! Analyzer configuration
//!
//! Resolved once by the host at startup and injected into the client.
//! Nothing below reads the environment at analysis time.

use crate::ai::credentials::CredentialManager;
use std::time::Duration;

/// Default Gemini REST base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default multimodal model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Keychain account name for the Gemini key
pub const CREDENTIAL_PROVIDER: &str = "gemini";

/// Environment variables checked for the API key, in order
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Configuration for the Gemini analysis client
#[derive(Clone)]
pub struct AnalyzerConfig {
    /// API key; `None` makes every analysis fail with an auth error
    pub api_key: Option<String>,

    /// Base URL for API (default: generativelanguage.googleapis.com/v1beta)
    pub base_url: String,

    /// Model to use (default: gemini-2.5-flash)
    pub model: String,

    /// Deadline for one request; expiry is reported as a network error
    pub request_timeout: Option<Duration>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: None,
        }
    }
}

// Keep the key out of debug output.
impl std::fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl AnalyzerConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build a config from the process environment.
    ///
    /// Falls back to the OS keychain for the key. The host is expected to
    /// have called [`load_dotenv`] once at startup.
    pub fn from_env() -> Self {
        let mut config = Self::from_lookup(|name| std::env::var(name).ok());

        if config.api_key.is_none() {
            match CredentialManager::get_api_key(CREDENTIAL_PROVIDER) {
                Ok(key) => {
                    tracing::debug!("Using API key from credential store");
                    config.api_key = non_blank(key);
                }
                Err(e) => tracing::debug!("No stored API key: {}", e),
            }
        }

        config
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.api_key = API_KEY_VARS
            .iter()
            .copied()
            .find_map(|name| lookup(name).and_then(non_blank));

        if let Some(model) = lookup("GEMINI_MODEL").and_then(non_blank) {
            config.model = model;
        }

        if let Some(base) = lookup("GEMINI_API_BASE").and_then(non_blank) {
            config.base_url = base.trim_end_matches('/').to_string();
        }

        match lookup("PROMPT_LENS_TIMEOUT_SECS").map(|v| v.trim().parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => {
                config.request_timeout = Some(Duration::from_secs(secs));
            }
            Some(Ok(_)) | None => {}
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid PROMPT_LENS_TIMEOUT_SECS: {}", e);
            }
        }

        config
    }

    /// Whether a usable key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty())
            .unwrap_or(false)
    }

    /// Full `generateContent` endpoint for the configured model
    pub fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model_path
        )
    }
}

/// Load `.env` from the current directory, falling back to the parent.
pub fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(!config.has_api_key());
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_gemini_key_takes_precedence() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "primary"),
            ("API_KEY", "secondary"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_blank_key_is_ignored() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "   "),
            ("API_KEY", "fallback"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("fallback"));

        let none = AnalyzerConfig::from_lookup(lookup_from(&[("API_KEY", "")]));
        assert!(!none.has_api_key());
    }

    #[test]
    fn test_overrides_and_timeout() {
        let config = AnalyzerConfig::from_lookup(lookup_from(&[
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_API_BASE", "http://localhost:8080/v1beta/"),
            ("PROMPT_LENS_TIMEOUT_SECS", "30"),
        ]));
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.base_url, "http://localhost:8080/v1beta");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_timeout_is_ignored() {
        let config =
            AnalyzerConfig::from_lookup(lookup_from(&[("PROMPT_LENS_TIMEOUT_SECS", "soon")]));
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_endpoint() {
        let config = AnalyzerConfig::default();
        assert_eq!(
            config.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );

        let prefixed = AnalyzerConfig::default().with_model("models/custom");
        assert!(prefixed.endpoint().ends_with("/models/custom:generateContent"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AnalyzerConfig::default().with_api_key("secret-key");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
