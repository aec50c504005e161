//! Response envelopes for the two claim-creation entry points.
//!
//! Both keep their historical JSON bodies; the HTTP-style status travels
//! alongside so the caller can branch on the response class.

use super::workflow::SepOutcome;
use crate::error::AppError;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
pub struct SepResponse {
    pub status: u16,
    pub body: Value,
}

impl SepResponse {
    pub fn created(body: Value) -> Self {
        Self { status: 201, body }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            status: err.status(),
            body: error_body(err),
        }
    }
}

/// `{error}` (4xx) or `{error, message}` (5xx).
pub fn error_body(err: &AppError) -> Value {
    match err {
        AppError::Upstream(_) | AppError::Config(_) | AppError::Document(_) => json!({
            "error": "Internal server error",
            "message": err.to_string(),
        }),
        _ => json!({ "error": err.to_string() }),
    }
}

/// `{success, message, data}` shape of the flat-payload endpoint.
pub fn sep_created_body(outcome: &SepOutcome) -> Value {
    let reg = &outcome.registrasi;
    json!({
        "success": true,
        "message": "SEP berhasil dibuat",
        "data": {
            "registrasi_id": reg.id,
            "pasien_id": reg.pasien_id,
            "dokter_id": reg.dokter_id,
            "rumah_sakit_id": reg.rumah_sakit_id,
            "tanggal_kunjungan": reg.tanggal_kunjungan,
            "jenis_pelayanan": reg.jenis_pelayanan,
            "status_kirim": reg.status_kirim,
            "uploaded_files": outcome
                .uploaded
                .iter()
                .map(|f| f.nama_file.clone())
                .collect::<Vec<_>>(),
            "total_files": outcome.total_files,
        }
    })
}

/// `{message, registrasi, files}` shape of the auth-block endpoint.
pub fn tambah_created_body(outcome: &SepOutcome) -> Value {
    json!({
        "message": "Registrasi SEP berhasil dibuat.",
        "registrasi": outcome.registrasi,
        "files": outcome.uploaded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Registrasi, RegistrasiFile, StatusSep};

    fn outcome() -> SepOutcome {
        SepOutcome {
            registrasi: Registrasi {
                id: "reg-1".to_string(),
                rumah_sakit_id: "rs-1".to_string(),
                pasien_id: "p-1".to_string(),
                dokter_id: "d-1".to_string(),
                tanggal_kunjungan: "2025-06-01".to_string(),
                jenis_pelayanan: None,
                status_kirim: Some(StatusSep::Menunggu),
                status_audit: Some(StatusSep::Menunggu),
                file_merge: None,
                created_at: None,
                pasien: None,
                dokter: None,
                rumah_sakit: None,
            },
            uploaded: vec![RegistrasiFile {
                id: "file-1".to_string(),
                registrasi_id: "reg-1".to_string(),
                nama_file: "resume.pdf".to_string(),
                path_file: "registrasi/reg-1/reg-1_x.pdf".to_string(),
                tipe: Some("application/pdf".to_string()),
                created_at: None,
            }],
            total_files: 2,
        }
    }

    #[test]
    fn test_created_body_lists_persisted_names_and_counts() {
        let body = sep_created_body(&outcome());
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["uploaded_files"][0], "resume.pdf");
        assert_eq!(body["data"]["total_files"], 2);
        assert_eq!(body["data"]["status_kirim"], "menunggu");
    }

    #[test]
    fn test_validation_error_is_flat_400() {
        let resp = SepResponse::error(&AppError::validation("tanggal_kunjungan"));
        assert_eq!(resp.status, 400);
        assert_eq!(
            resp.body["error"],
            "Missing required field: tanggal_kunjungan"
        );
        assert!(resp.body.get("message").is_none());
    }

    #[test]
    fn test_upstream_error_carries_generic_and_detail() {
        let resp = SepResponse::error(&AppError::upstream("insert blew up"));
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["error"], "Internal server error");
        assert_eq!(resp.body["message"], "insert blew up");
    }
}
