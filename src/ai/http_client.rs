//! Shared HTTP Client Module
//!
//! Provides a global, lazy-initialized HTTP client with connection pooling
//! for Gemini API calls. Re-analysis of the same image reuses the
//! established TLS connection.
//!
//! No overall request timeout is set here; per-call deadlines come from
//! [`AnalyzerConfig::request_timeout`](crate::AnalyzerConfig).

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Global HTTP client for Gemini API calls
///
/// - 15s connect timeout
/// - 4 idle connections per host (one session rarely needs more)
/// - 90s idle timeout
static GEMINI_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(15))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
        .unwrap_or_else(|e| {
            tracing::error!("Failed to build tuned HTTP client: {}. Using defaults.", e);
            Client::new()
        })
});

/// Get the global Gemini HTTP client
#[inline]
pub fn gemini_client() -> &'static Client {
    &GEMINI_CLIENT
}
