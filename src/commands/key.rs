use crate::ai::CredentialManager;
use crate::config::{API_KEY_VARS, CREDENTIAL_PROVIDER};

/// API key status
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatus {
    pub provider: String,
    pub stored: bool,
    pub env_configured: bool,
}

/// Store the Gemini API key in the credential store
pub fn set_api_key(api_key: &str) -> Result<(), String> {
    let key = api_key.trim();
    if key.is_empty() {
        return Err("API key is empty".to_string());
    }

    CredentialManager::store_api_key(CREDENTIAL_PROVIDER, key).map_err(|e| e.to_string())?;
    tracing::info!(
        verified = CredentialManager::has_api_key(CREDENTIAL_PROVIDER),
        "Stored Gemini API key"
    );
    Ok(())
}

/// Remove the stored Gemini API key
pub fn delete_api_key() -> Result<(), String> {
    CredentialManager::delete_api_key(CREDENTIAL_PROVIDER).map_err(|e| e.to_string())
}

/// Report where a key is available from
pub fn key_status() -> KeyStatus {
    let env_configured = API_KEY_VARS
        .iter()
        .any(|name| std::env::var(name).map(|v| !v.trim().is_empty()).unwrap_or(false));

    KeyStatus {
        provider: CREDENTIAL_PROVIDER.to_string(),
        stored: CredentialManager::has_api_key(CREDENTIAL_PROVIDER),
        env_configured,
    }
}
