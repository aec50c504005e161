//! Remote store client.
//!
//! Thin typed wrappers over the hosted backend: password auth, a
//! PostgREST-style table API, and object storage. The client handle is
//! constructed once at startup and passed to whoever needs it; there is no
//! global instance.

mod auth;
mod postgrest;
mod storage;

pub use auth::AuthSession;
pub use postgrest::Query;

use crate::error::AppError;
use reqwest::Client;
use std::time::Duration;

/// Connection settings, read from the environment at process start.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Public (anon) API key, used for the password exchange.
    pub anon_key: String,
    /// Service-role key, used for table and storage operations.
    pub service_role_key: String,
}

impl SupabaseConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let url = require_env("SUPABASE_URL")?;
        let anon_key = require_env("SUPABASE_ANON_KEY")?;
        let service_role_key = require_env("SUPABASE_SERVICE_ROLE_KEY")?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            service_role_key,
        })
    }
}

fn require_env(name: &str) -> Result<String, AppError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Config(format!("{} is not set", name)))
}

/// Handle to the remote store.
///
/// Owns a pooled HTTP client; request timeouts cover the largest expected
/// payloads (10 MiB uploads).
pub struct SupabaseClient {
    http: Client,
    config: SupabaseConfig,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Headers for table/storage calls (service role).
    pub(crate) fn service_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.config.service_role_key).header(
            "Authorization",
            format!("Bearer {}", self.config.service_role_key),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_trims_trailing_slash() {
        std::env::set_var("SUPABASE_URL", "https://example.supabase.co/");
        std::env::set_var("SUPABASE_ANON_KEY", "anon");
        std::env::set_var("SUPABASE_SERVICE_ROLE_KEY", "service");
        let config = SupabaseConfig::from_env().unwrap();
        assert_eq!(config.url, "https://example.supabase.co");
    }

    #[test]
    fn test_missing_env_is_config_error() {
        std::env::remove_var("SUPABASE_URL_MISSING_TEST");
        let err = require_env("SUPABASE_URL_MISSING_TEST").unwrap_err();
        assert_eq!(err.status(), 500);
    }
}
