use crate::error::CredentialError;
use base64::{engine::general_purpose::STANDARD, Engine};
use keyring::Entry;
#[cfg(debug_assertions)]
use std::fs;
#[cfg(debug_assertions)]
use std::path::PathBuf;

const SERVICE_NAME: &str = "com.promptlens.cli";

/// Credential manager using the OS keychain with file fallback for development
pub struct CredentialManager;

impl CredentialManager {
    /// Get the fallback file path for storing credentials (dev mode only)
    #[cfg(debug_assertions)]
    fn get_fallback_path(provider: &str) -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("prompt-lens").join(format!("{}_key", provider)))
    }

    /// Store an API key in the keychain (with file fallback in dev mode)
    pub fn store_api_key(provider: &str, api_key: &str) -> Result<(), CredentialError> {
        let keychain_error = match Entry::new(SERVICE_NAME, provider) {
            Ok(entry) => match entry.set_password(api_key) {
                Ok(()) => {
                    tracing::debug!(provider, "Stored API key in keychain");
                    return Ok(());
                }
                Err(e) => e.to_string(),
            },
            Err(e) => e.to_string(),
        };
        tracing::debug!(provider, "Keychain unavailable: {}", keychain_error);

        #[cfg(debug_assertions)]
        {
            if let Some(path) = Self::get_fallback_path(provider) {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }

                // Base64 only keeps the key from being read at a glance
                fs::write(&path, STANDARD.encode(api_key))?;
                tracing::warn!("DEV MODE: Stored API key in file: {:?}", path);
                return Ok(());
            }
        }

        Err(CredentialError::Unavailable(keychain_error))
    }

    /// Get an API key from the keychain (with file fallback in dev mode)
    pub fn get_api_key(provider: &str) -> Result<String, CredentialError> {
        if let Ok(entry) = Entry::new(SERVICE_NAME, provider) {
            if let Ok(password) = entry.get_password() {
                tracing::debug!(provider, "Retrieved API key from keychain");
                return Ok(password);
            }
        }

        #[cfg(debug_assertions)]
        {
            if let Some(path) = Self::get_fallback_path(provider) {
                if path.exists() {
                    let encoded = fs::read_to_string(&path)?;
                    return decode_stored_key(&encoded);
                }
            }
        }

        Err(CredentialError::NotFound)
    }

    /// Delete an API key from the keychain and file storage
    pub fn delete_api_key(provider: &str) -> Result<(), CredentialError> {
        if let Ok(entry) = Entry::new(SERVICE_NAME, provider) {
            let _ = entry.delete_credential();
            tracing::debug!(provider, "Deleted API key from keychain");
        }

        #[cfg(debug_assertions)]
        {
            if let Some(path) = Self::get_fallback_path(provider) {
                if path.exists() {
                    fs::remove_file(&path)?;
                    tracing::debug!("DEV MODE: Deleted API key file: {:?}", path);
                }
            }
        }

        Ok(())
    }

    /// Check if an API key is configured
    pub fn has_api_key(provider: &str) -> bool {
        Self::get_api_key(provider).is_ok()
    }
}

#[cfg_attr(not(debug_assertions), allow(dead_code))]
fn decode_stored_key(encoded: &str) -> Result<String, CredentialError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CredentialError::Unavailable(format!("Corrupt credential file: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| CredentialError::Unavailable(format!("Invalid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_stored_key() {
        let encoded = STANDARD.encode("AIza-test-key");
        assert_eq!(decode_stored_key(&encoded).unwrap(), "AIza-test-key");
        assert_eq!(decode_stored_key(&format!("{}\n", encoded)).unwrap(), "AIza-test-key");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_stored_key("not base64!!").is_err());
    }
}
