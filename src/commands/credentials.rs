//! API-key management for the analysis panel.

use crate::credentials::CredentialManager;
use serde::Serialize;

const GEMINI_PROVIDER: &str = "gemini";

#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub provider: String,
    pub configured: bool,
}

#[tauri::command]
pub async fn set_api_key(provider: String, api_key: String) -> Result<bool, String> {
    if provider != GEMINI_PROVIDER {
        return Err(format!("Unknown provider: {}", provider));
    }
    let key = api_key.trim();
    if key.is_empty() {
        return Err("API key is empty".to_string());
    }
    CredentialManager::store_api_key(&provider, key)?;
    Ok(true)
}

#[tauri::command]
pub fn delete_api_key(provider: String) -> Result<(), String> {
    CredentialManager::delete_api_key(&provider)
}

#[tauri::command]
pub fn get_configured_providers() -> Vec<ProviderStatus> {
    vec![ProviderStatus {
        provider: GEMINI_PROVIDER.to_string(),
        configured: CredentialManager::has_api_key(GEMINI_PROVIDER),
    }]
}
