//! Row types for the remote tables.
//!
//! Field names match the store schema (`rumah_sakit`, `pasien`, `dokter`,
//! `registrasi`, `registrasi_file`, `profiles`). Optional embedded relations
//! are populated when a list query asks for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Send/audit status of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSep {
    /// Waiting to be sent / audited.
    Menunggu,
    /// Accepted by the insurer.
    Terkirim,
    /// Rejected by the insurer.
    Ditolak,
}

impl StatusSep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Menunggu => "menunggu",
            Self::Terkirim => "terkirim",
            Self::Ditolak => "ditolak",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RumahSakit {
    pub id: String,
    pub nama: String,
    pub alamat: Option<String>,
    pub kode_faskes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pasien {
    pub id: String,
    pub rumah_sakit_id: String,
    pub nama: String,
    pub nik: Option<String>,
    pub no_kartu_bpjs: Option<String>,
    pub tgl_lahir: Option<String>,
    pub jenis_kelamin: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rumah_sakit: Option<RumahSakit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dokter {
    pub id: String,
    pub rumah_sakit_id: String,
    pub nama: String,
    pub spesialisasi: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rumah_sakit: Option<RumahSakit>,
}

/// User → hospital mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    #[serde(default)]
    pub nama: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub rumah_sakit_id: Option<String>,
}

/// Claim registration ("SEP") row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registrasi {
    pub id: String,
    pub rumah_sakit_id: String,
    pub pasien_id: String,
    pub dokter_id: String,
    pub tanggal_kunjungan: String,
    pub jenis_pelayanan: Option<String>,
    pub status_kirim: Option<StatusSep>,
    pub status_audit: Option<StatusSep>,
    pub file_merge: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pasien: Option<Pasien>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dokter: Option<Dokter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rumah_sakit: Option<RumahSakit>,
}

/// Attachment metadata row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrasiFile {
    pub id: String,
    pub registrasi_id: String,
    pub nama_file: String,
    pub path_file: String,
    pub tipe: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

// Insert payloads. The store assigns `id` and `created_at`.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRumahSakit {
    pub nama: String,
    pub alamat: Option<String>,
    pub kode_faskes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPasien {
    pub rumah_sakit_id: String,
    pub nama: String,
    pub nik: Option<String>,
    pub no_kartu_bpjs: Option<String>,
    pub tgl_lahir: Option<String>,
    pub jenis_kelamin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDokter {
    pub rumah_sakit_id: String,
    pub nama: String,
    pub spesialisasi: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRegistrasi {
    pub rumah_sakit_id: String,
    pub pasien_id: String,
    pub dokter_id: String,
    pub tanggal_kunjungan: String,
    pub jenis_pelayanan: Option<String>,
    pub status_kirim: StatusSep,
    pub status_audit: StatusSep,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRegistrasiFile {
    pub registrasi_id: String,
    pub nama_file: String,
    pub path_file: String,
    pub tipe: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&StatusSep::Menunggu).unwrap(),
            "\"menunggu\""
        );
        let parsed: StatusSep = serde_json::from_str("\"ditolak\"").unwrap();
        assert_eq!(parsed, StatusSep::Ditolak);
    }

    #[test]
    fn test_registrasi_embeds_optional() {
        let json = r#"{
            "id": "reg-1",
            "rumah_sakit_id": "rs-1",
            "pasien_id": "p-1",
            "dokter_id": "d-1",
            "tanggal_kunjungan": "2025-06-01",
            "jenis_pelayanan": null,
            "status_kirim": "menunggu",
            "status_audit": "menunggu",
            "file_merge": null,
            "created_at": null
        }"#;
        let reg: Registrasi = serde_json::from_str(json).unwrap();
        assert!(reg.pasien.is_none());
        assert_eq!(reg.status_kirim, Some(StatusSep::Menunggu));
    }
}
