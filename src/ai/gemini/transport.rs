//! HTTP transport for `generateContent`
//!
//! Split from the client so the request/response contract can be
//! exercised without a network.

use super::types::{ApiError, GenerateContentRequest, GenerateContentResponse};
use crate::ai::http_client::gemini_client;
use crate::error::AnalysisError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// One request/response exchange with the generative API
#[async_trait]
pub trait GenerateTransport: Send + Sync {
    async fn generate(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AnalysisError>;
}

/// reqwest-backed transport using the shared pooled client
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: gemini_client().clone(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerateTransport for HttpTransport {
    async fn generate(
        &self,
        endpoint: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AnalysisError> {
        let response = self
            .client
            .post(endpoint)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AnalysisError::network(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Network {
                status: Some(status.as_u16()),
                message: format!("Failed to read response: {}", e),
            })?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| AnalysisError::Network {
            status: Some(status.as_u16()),
            message: format!("Failed to parse response: {}", e),
        })
    }
}

/// Map a non-success status and body to an error kind.
pub fn classify_failure(status: StatusCode, body: &str) -> AnalysisError {
    let (message, api_status) = match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => (api_error.error.message, api_error.error.status),
        Err(_) => (body.trim().to_string(), None),
    };

    let names_key = message.to_lowercase().contains("api key")
        || api_status.as_deref() == Some("UNAUTHENTICATED");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AnalysisError::Auth(message),
        StatusCode::BAD_REQUEST if names_key => AnalysisError::Auth(message),
        _ => AnalysisError::Network {
            status: Some(status.as_u16()),
            message: if message.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                message
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_is_auth_error() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, AnalysisError::Auth(ref m) if m.contains("API key not valid")));
    }

    #[test]
    fn test_forbidden_is_auth_error() {
        let err = classify_failure(StatusCode::FORBIDDEN, "denied");
        assert!(matches!(err, AnalysisError::Auth(_)));
    }

    #[test]
    fn test_other_bad_request_is_network_error() {
        let body = r#"{"error": {"code": 400, "message": "Unsupported MIME type", "status": "INVALID_ARGUMENT"}}"#;
        match classify_failure(StatusCode::BAD_REQUEST, body) {
            AnalysisError::Network { status, message } => {
                assert_eq!(status, Some(400));
                assert_eq!(message, "Unsupported MIME type");
            }
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_body_uses_reason_phrase() {
        match classify_failure(StatusCode::SERVICE_UNAVAILABLE, "") {
            AnalysisError::Network { status, message } => {
                assert_eq!(status, Some(503));
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
