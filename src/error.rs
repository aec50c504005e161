//! Application error taxonomy.
//!
//! Hard failures (authentication, authorization, validation, primary writes)
//! abort the operation that raised them; attachment-level failures are
//! handled in-line by the claim workflow and never surface as an `AppError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad credentials during the password exchange.
    #[error("Autentikasi gagal.")]
    Authentication,

    /// No profile row or no hospital mapping for the authenticated user.
    #[error("Tidak dapat mengambil rumah_sakit_id dari profile.")]
    Authorization,

    /// A required field is missing or an attachment is unacceptable.
    #[error("Missing required field: {field}")]
    Validation { field: String },

    /// The remote store or object storage rejected a call.
    #[error("{0}")]
    Upstream(String),

    /// Missing or malformed environment configuration.
    #[error("Server configuration error: {0}")]
    Config(String),

    /// A document could not be parsed or assembled.
    #[error("{0}")]
    Document(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation { field: field.into() }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// HTTP-style status class for the response envelope.
    pub fn status(&self) -> u16 {
        match self {
            Self::Authentication => 401,
            Self::Authorization => 403,
            Self::Validation { .. } => 400,
            Self::Upstream(_) | Self::Config(_) | Self::Document(_) => 500,
        }
    }
}

/// Commands surface flat strings to the webview.
impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert_eq!(AppError::Authentication.status(), 401);
        assert_eq!(AppError::Authorization.status(), 403);
        assert_eq!(AppError::validation("tanggal_kunjungan").status(), 400);
        assert_eq!(AppError::upstream("insert failed").status(), 500);
    }

    #[test]
    fn test_validation_names_field() {
        let err = AppError::validation("nama_pasien");
        assert_eq!(err.to_string(), "Missing required field: nama_pasien");
    }
}
