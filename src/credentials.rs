//! API-key storage for the generative-text provider.
//!
//! Keys live in the OS keychain. `GEMINI_API_KEY` from the environment is
//! honored as a fallback so headless/dev runs work without a keychain; keys
//! are never compiled in.

use base64::Engine;
use keyring::Entry;
use std::fs;
use std::path::PathBuf;

const SERVICE_NAME: &str = "com.dextra.sep";

/// Environment variable consulted when the keychain has no entry.
fn env_var_for(provider: &str) -> String {
    format!("{}_API_KEY", provider.to_uppercase())
}

pub struct CredentialManager;

impl CredentialManager {
    /// File fallback location for dev builds without a usable keychain.
    #[cfg(debug_assertions)]
    fn fallback_path(provider: &str) -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dextra-sep").join(format!("{}_key", provider)))
    }

    /// Store an API key in the keychain (file fallback in dev mode).
    pub fn store_api_key(provider: &str, api_key: &str) -> Result<(), String> {
        match Entry::new(SERVICE_NAME, provider) {
            Ok(entry) => {
                if entry.set_password(api_key).is_ok() {
                    tracing::info!("[Credentials] Stored API key for {}", provider);
                    return Ok(());
                }
            }
            Err(e) => {
                tracing::warn!("[Credentials] Keychain unavailable: {}", e);
            }
        }

        #[cfg(debug_assertions)]
        {
            if let Some(path) = Self::fallback_path(provider) {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| format!("Failed to create config directory: {}", e))?;
                }
                // Base64 is obfuscation only; the file lives in the user's
                // config dir and exists for dev builds alone.
                let encoded = base64::engine::general_purpose::STANDARD.encode(api_key);
                fs::write(&path, encoded).map_err(|e| format!("Failed to write API key: {}", e))?;
                return Ok(());
            }
        }

        Err("Secure credential storage unavailable".to_string())
    }

    /// Get an API key: keychain, then environment, then dev file fallback.
    pub fn get_api_key(provider: &str) -> Result<String, String> {
        if let Ok(entry) = Entry::new(SERVICE_NAME, provider) {
            if let Ok(password) = entry.get_password() {
                return Ok(password);
            }
        }

        if let Ok(key) = std::env::var(env_var_for(provider)) {
            if !key.is_empty() {
                return Ok(key);
            }
        }

        #[cfg(debug_assertions)]
        {
            if let Some(path) = Self::fallback_path(provider) {
                if path.exists() {
                    let encoded = fs::read_to_string(&path)
                        .map_err(|e| format!("Failed to read API key: {}", e))?;
                    let bytes = base64::engine::general_purpose::STANDARD
                        .decode(encoded.trim())
                        .map_err(|e| format!("Corrupt API key file: {}", e))?;
                    return String::from_utf8(bytes).map_err(|e| format!("Invalid UTF-8: {}", e));
                }
            }
        }

        Err(format!("API key not found for {}", provider))
    }

    /// Delete an API key from the keychain and the dev fallback file.
    pub fn delete_api_key(provider: &str) -> Result<(), String> {
        if let Ok(entry) = Entry::new(SERVICE_NAME, provider) {
            let _ = entry.delete_credential();
        }

        #[cfg(debug_assertions)]
        {
            if let Some(path) = Self::fallback_path(provider) {
                if path.exists() {
                    fs::remove_file(&path)
                        .map_err(|e| format!("Failed to delete API key file: {}", e))?;
                }
            }
        }

        Ok(())
    }

    pub fn has_api_key(provider: &str) -> bool {
        Self::get_api_key(provider).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_for("gemini"), "GEMINI_API_KEY");
    }

    #[test]
    fn test_env_fallback() {
        std::env::set_var("TESTPROVIDER_API_KEY", "k-123");
        assert_eq!(
            CredentialManager::get_api_key("testprovider").unwrap(),
            "k-123"
        );
        std::env::remove_var("TESTPROVIDER_API_KEY");
    }
}
