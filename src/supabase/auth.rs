//! Password-grant authentication.

use super::SupabaseClient;
use crate::error::AppError;
use serde::Deserialize;
use serde_json::json;

/// Result of a successful password exchange.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: String,
    pub access_token: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: String,
}

impl SupabaseClient {
    /// Exchange email/password for a session. Any rejection maps to an
    /// authentication error; there is no retry.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.config.url);

        let resp = self
            .http()
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Auth request failed: {}", e)))?;

        if !resp.status().is_success() {
            tracing::warn!("[Auth] Sign-in rejected for {}: {}", email, resp.status());
            return Err(AppError::Authentication);
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Failed to parse auth response: {}", e)))?;

        Ok(AuthSession {
            user_id: token.user.id,
            access_token: token.access_token,
        })
    }
}
