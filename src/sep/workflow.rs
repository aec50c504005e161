//! The find-or-create + attach sequence.
//!
//! Policy (in order): profile lookup is a hard authorization failure;
//! missing required fields are hard validation failures naming the first
//! missing field; patient/doctor/registration writes are hard upstream
//! failures; attachment handling is soft — an invalid or failed attachment
//! is logged and skipped, the rest keep going. Patients or doctors created
//! before a later registration-insert failure are not rolled back.

use super::store::{DocumentStore, SepStore};
use crate::error::AppError;
use crate::models::{
    NewDokter, NewPasien, NewRegistrasi, NewRegistrasiFile, Registrasi, RegistrasiFile, StatusSep,
};
use uuid::Uuid;

/// Attachment size cap: 10 MiB.
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Accepted attachment content types.
const ALLOWED_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/jpg", "image/png"];

/// Claim payload. The detail fields are optional and only populate a
/// patient/doctor row that is being created, never an existing one.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct SepData {
    pub nama_pasien: String,
    pub nama_dokter: String,
    pub tanggal_kunjungan: String,
    #[serde(default)]
    pub jenis_pelayanan: Option<String>,
    #[serde(default)]
    pub nik: Option<String>,
    #[serde(default)]
    pub no_kartu_bpjs: Option<String>,
    #[serde(default)]
    pub tgl_lahir: Option<String>,
    #[serde(default)]
    pub jenis_kelamin: Option<String>,
    #[serde(default)]
    pub spesialisasi_dokter: Option<String>,
}

/// One file attached to a claim submission.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// What the workflow produced.
#[derive(Debug)]
pub struct SepOutcome {
    pub registrasi: Registrasi,
    pub uploaded: Vec<RegistrasiFile>,
    /// Attachments received, valid or not.
    pub total_files: usize,
}

pub struct SepEngine<'a> {
    store: &'a dyn SepStore,
    documents: &'a dyn DocumentStore,
    bucket: &'a str,
}

impl<'a> SepEngine<'a> {
    pub fn new(store: &'a dyn SepStore, documents: &'a dyn DocumentStore, bucket: &'a str) -> Self {
        Self {
            store,
            documents,
            bucket,
        }
    }

    /// Run the workflow for an already-authenticated caller.
    pub async fn create(
        &self,
        user_id: &str,
        data: SepData,
        files: Vec<Attachment>,
    ) -> Result<SepOutcome, AppError> {
        let rumah_sakit_id = self
            .store
            .rumah_sakit_for_user(user_id)
            .await?
            .ok_or(AppError::Authorization)?;

        validate_required(&data)?;

        let pasien = self
            .store
            .upsert_pasien(NewPasien {
                rumah_sakit_id: rumah_sakit_id.clone(),
                nama: data.nama_pasien.clone(),
                nik: data.nik.clone(),
                no_kartu_bpjs: data.no_kartu_bpjs.clone(),
                tgl_lahir: data.tgl_lahir.clone(),
                jenis_kelamin: data.jenis_kelamin.clone(),
            })
            .await?;

        let dokter = self
            .store
            .upsert_dokter(NewDokter {
                rumah_sakit_id: rumah_sakit_id.clone(),
                nama: data.nama_dokter.clone(),
                spesialisasi: data.spesialisasi_dokter.clone(),
            })
            .await?;

        let registrasi = self
            .store
            .insert_registrasi(NewRegistrasi {
                rumah_sakit_id,
                pasien_id: pasien.id.clone(),
                dokter_id: dokter.id.clone(),
                tanggal_kunjungan: data.tanggal_kunjungan.clone(),
                jenis_pelayanan: data.jenis_pelayanan.clone(),
                status_kirim: StatusSep::Menunggu,
                status_audit: StatusSep::Menunggu,
            })
            .await?;

        let total_files = files.len();
        let uploaded = self.attach_files(&registrasi.id, files).await;

        tracing::info!(
            "[Sep] Registration {} created ({}/{} attachments stored)",
            registrasi.id,
            uploaded.len(),
            total_files
        );

        Ok(SepOutcome {
            registrasi,
            uploaded,
            total_files,
        })
    }

    /// Store as many attachments as validation allows. Every failure here is
    /// per-file: logged, skipped, and the loop continues.
    async fn attach_files(&self, registrasi_id: &str, files: Vec<Attachment>) -> Vec<RegistrasiFile> {
        let mut uploaded = Vec::new();

        for file in files {
            if let Err(reason) = validate_attachment(&file) {
                tracing::warn!("[Sep] Skipping file {}: {}", file.name, reason);
                continue;
            }

            let path = derive_storage_path(registrasi_id, &file.name);

            if let Err(e) = self
                .documents
                .upload(self.bucket, &path, file.bytes, &file.content_type)
                .await
            {
                tracing::warn!("[Sep] Gagal upload file {}: {}", file.name, e);
                continue;
            }

            match self
                .store
                .insert_registrasi_file(NewRegistrasiFile {
                    registrasi_id: registrasi_id.to_string(),
                    nama_file: file.name.clone(),
                    path_file: path.clone(),
                    tipe: Some(file.content_type.clone()),
                })
                .await
            {
                Ok(record) => uploaded.push(record),
                Err(e) => {
                    // The bytes are in storage but unreferenced; delete them
                    // so no orphan object is left behind.
                    tracing::warn!("[Sep] Gagal menyimpan info file {}: {}", file.name, e);
                    if let Err(e) = self.documents.remove(self.bucket, &path).await {
                        tracing::warn!("[Sep] Orphan cleanup failed for {}: {}", path, e);
                    }
                }
            }
        }

        uploaded
    }
}

fn validate_required(data: &SepData) -> Result<(), AppError> {
    for (field, value) in [
        ("nama_pasien", &data.nama_pasien),
        ("nama_dokter", &data.nama_dokter),
        ("tanggal_kunjungan", &data.tanggal_kunjungan),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::validation(field));
        }
    }
    Ok(())
}

fn validate_attachment(file: &Attachment) -> Result<(), String> {
    let content_type = file.content_type.to_lowercase();
    if !ALLOWED_TYPES.contains(&content_type.as_str()) {
        return Err(format!("unsupported type: {}", file.content_type));
    }
    if file.bytes.len() > MAX_FILE_SIZE {
        return Err(format!("too large: {} bytes", file.bytes.len()));
    }
    Ok(())
}

/// `registrasi/{id}/{id}_{token}.{ext}` — unique by token, grouped by
/// registration.
pub(crate) fn derive_storage_path(registrasi_id: &str, file_name: &str) -> String {
    let ext = file_name.rsplit('.').next().filter(|e| !e.is_empty() && *e != file_name);
    let token = Uuid::new_v4().simple().to_string();
    match ext {
        Some(ext) => format!(
            "registrasi/{}/{}_{}.{}",
            registrasi_id, registrasi_id, token, ext.to_lowercase()
        ),
        None => format!("registrasi/{}/{}_{}", registrasi_id, registrasi_id, token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dokter, Pasien};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory relational store double.
    #[derive(Default)]
    struct MemStore {
        profiles: HashMap<String, String>,
        pasien: Mutex<Vec<Pasien>>,
        dokter: Mutex<Vec<Dokter>>,
        registrasi: Mutex<Vec<Registrasi>>,
        files: Mutex<Vec<RegistrasiFile>>,
        fail_registrasi_insert: bool,
        fail_file_insert: bool,
        next_id: AtomicUsize,
    }

    impl MemStore {
        fn with_profile(user_id: &str, rumah_sakit_id: &str) -> Self {
            let mut store = Self::default();
            store
                .profiles
                .insert(user_id.to_string(), rumah_sakit_id.to_string());
            store
        }

        fn gen_id(&self, prefix: &str) -> String {
            format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
        }
    }

    #[async_trait]
    impl SepStore for MemStore {
        async fn rumah_sakit_for_user(&self, user_id: &str) -> Result<Option<String>, AppError> {
            Ok(self.profiles.get(user_id).cloned())
        }

        async fn upsert_pasien(&self, data: NewPasien) -> Result<Pasien, AppError> {
            let mut rows = self.pasien.lock().unwrap();
            if let Some(existing) = rows
                .iter()
                .find(|p| p.nama == data.nama && p.rumah_sakit_id == data.rumah_sakit_id)
            {
                return Ok(existing.clone());
            }
            let row = Pasien {
                id: self.gen_id("pasien"),
                rumah_sakit_id: data.rumah_sakit_id,
                nama: data.nama,
                nik: data.nik,
                no_kartu_bpjs: data.no_kartu_bpjs,
                tgl_lahir: data.tgl_lahir,
                jenis_kelamin: data.jenis_kelamin,
                created_at: None,
                rumah_sakit: None,
            };
            rows.push(row.clone());
            Ok(row)
        }

        async fn upsert_dokter(&self, data: NewDokter) -> Result<Dokter, AppError> {
            let mut rows = self.dokter.lock().unwrap();
            if let Some(existing) = rows
                .iter()
                .find(|d| d.nama == data.nama && d.rumah_sakit_id == data.rumah_sakit_id)
            {
                return Ok(existing.clone());
            }
            let row = Dokter {
                id: self.gen_id("dokter"),
                rumah_sakit_id: data.rumah_sakit_id,
                nama: data.nama,
                spesialisasi: data.spesialisasi,
                created_at: None,
                rumah_sakit: None,
            };
            rows.push(row.clone());
            Ok(row)
        }

        async fn insert_registrasi(&self, data: NewRegistrasi) -> Result<Registrasi, AppError> {
            if self.fail_registrasi_insert {
                return Err(AppError::upstream("registrasi insert failed"));
            }
            let row = Registrasi {
                id: self.gen_id("reg"),
                rumah_sakit_id: data.rumah_sakit_id,
                pasien_id: data.pasien_id,
                dokter_id: data.dokter_id,
                tanggal_kunjungan: data.tanggal_kunjungan,
                jenis_pelayanan: data.jenis_pelayanan,
                status_kirim: Some(data.status_kirim),
                status_audit: Some(data.status_audit),
                file_merge: None,
                created_at: None,
                pasien: None,
                dokter: None,
                rumah_sakit: None,
            };
            self.registrasi.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn insert_registrasi_file(
            &self,
            data: NewRegistrasiFile,
        ) -> Result<RegistrasiFile, AppError> {
            if self.fail_file_insert {
                return Err(AppError::upstream("file insert failed"));
            }
            let row = RegistrasiFile {
                id: self.gen_id("file"),
                registrasi_id: data.registrasi_id,
                nama_file: data.nama_file,
                path_file: data.path_file,
                tipe: data.tipe,
                created_at: None,
            };
            self.files.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn files_for_registrasi(
            &self,
            registrasi_id: &str,
        ) -> Result<Vec<RegistrasiFile>, AppError> {
            Ok(self
                .files
                .lock()
                .unwrap()
                .iter()
                .filter(|f| f.registrasi_id == registrasi_id)
                .cloned()
                .collect())
        }

        async fn delete_registrasi_file(&self, file_id: &str) -> Result<(), AppError> {
            self.files.lock().unwrap().retain(|f| f.id != file_id);
            Ok(())
        }
    }

    /// In-memory object storage double.
    #[derive(Default)]
    struct MemDocs {
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl DocumentStore for MemDocs {
        async fn upload(
            &self,
            bucket: &str,
            path: &str,
            bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<(), AppError> {
            self.objects
                .lock()
                .unwrap()
                .insert(format!("{}/{}", bucket, path), bytes);
            Ok(())
        }

        async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, AppError> {
            self.objects
                .lock()
                .unwrap()
                .get(&format!("{}/{}", bucket, path))
                .cloned()
                .ok_or_else(|| AppError::upstream(format!("Gagal download file: {}", path)))
        }

        async fn remove(&self, bucket: &str, path: &str) -> Result<(), AppError> {
            self.objects
                .lock()
                .unwrap()
                .remove(&format!("{}/{}", bucket, path));
            Ok(())
        }

        fn public_url(&self, bucket: &str, path: &str) -> String {
            format!("mem://{}/{}", bucket, path)
        }
    }

    fn valid_data() -> SepData {
        SepData {
            nama_pasien: "Budi Santoso".to_string(),
            nama_dokter: "dr. Sari".to_string(),
            tanggal_kunjungan: "2025-06-01".to_string(),
            jenis_pelayanan: Some("Rawat Jalan".to_string()),
            ..Default::default()
        }
    }

    fn pdf_attachment(name: &str) -> Attachment {
        Attachment {
            name: name.to_string(),
            content_type: "application/pdf".to_string(),
            bytes: vec![0u8; 128],
        }
    }

    #[tokio::test]
    async fn test_new_names_create_one_patient_and_doctor() {
        let store = MemStore::with_profile("user-1", "rs-1");
        let docs = MemDocs::default();
        let engine = SepEngine::new(&store, &docs, "sep-documents");

        let outcome = engine.create("user-1", valid_data(), vec![]).await.unwrap();

        assert_eq!(store.pasien.lock().unwrap().len(), 1);
        assert_eq!(store.dokter.lock().unwrap().len(), 1);
        assert_eq!(outcome.registrasi.pasien_id, store.pasien.lock().unwrap()[0].id);
        assert_eq!(outcome.registrasi.dokter_id, store.dokter.lock().unwrap()[0].id);
        assert_eq!(outcome.registrasi.status_kirim, Some(StatusSep::Menunggu));
        assert_eq!(outcome.registrasi.status_audit, Some(StatusSep::Menunggu));
    }

    #[tokio::test]
    async fn test_existing_names_are_reused() {
        let store = MemStore::with_profile("user-1", "rs-1");
        let docs = MemDocs::default();
        let engine = SepEngine::new(&store, &docs, "sep-documents");

        let first = engine.create("user-1", valid_data(), vec![]).await.unwrap();
        let second = engine.create("user-1", valid_data(), vec![]).await.unwrap();

        assert_eq!(store.pasien.lock().unwrap().len(), 1);
        assert_eq!(store.dokter.lock().unwrap().len(), 1);
        assert_eq!(first.registrasi.pasien_id, second.registrasi.pasien_id);
        assert_eq!(first.registrasi.dokter_id, second.registrasi.dokter_id);
        // But a second registration row exists.
        assert_eq!(store.registrasi.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_visit_date_is_validation_error() {
        let store = MemStore::with_profile("user-1", "rs-1");
        let docs = MemDocs::default();
        let engine = SepEngine::new(&store, &docs, "sep-documents");

        let mut data = valid_data();
        data.tanggal_kunjungan = String::new();

        let err = engine.create("user-1", data, vec![]).await.unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(err.to_string().contains("tanggal_kunjungan"));
        // No registration row was created.
        assert!(store.registrasi.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unmapped_user_is_authorization_error() {
        let store = MemStore::default();
        let docs = MemDocs::default();
        let engine = SepEngine::new(&store, &docs, "sep-documents");

        let err = engine.create("user-x", valid_data(), vec![]).await.unwrap_err();
        assert_eq!(err.status(), 403);
    }

    #[tokio::test]
    async fn test_invalid_attachments_are_skipped_not_fatal() {
        let store = MemStore::with_profile("user-1", "rs-1");
        let docs = MemDocs::default();
        let engine = SepEngine::new(&store, &docs, "sep-documents");

        let files = vec![
            pdf_attachment("resume.pdf"),
            Attachment {
                name: "virus.exe".to_string(),
                content_type: "application/octet-stream".to_string(),
                bytes: vec![0u8; 16],
            },
            Attachment {
                name: "huge.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                bytes: vec![0u8; MAX_FILE_SIZE + 1],
            },
        ];

        let outcome = engine.create("user-1", valid_data(), files).await.unwrap();

        assert_eq!(outcome.total_files, 3);
        assert_eq!(outcome.uploaded.len(), 1);
        assert_eq!(outcome.uploaded[0].nama_file, "resume.pdf");
    }

    #[tokio::test]
    async fn test_zero_attachments_still_succeeds() {
        let store = MemStore::with_profile("user-1", "rs-1");
        let docs = MemDocs::default();
        let engine = SepEngine::new(&store, &docs, "sep-documents");

        let outcome = engine.create("user-1", valid_data(), vec![]).await.unwrap();
        assert!(outcome.uploaded.is_empty());
        assert_eq!(outcome.total_files, 0);
    }

    #[tokio::test]
    async fn test_metadata_failure_cleans_up_uploaded_bytes() {
        let mut store = MemStore::with_profile("user-1", "rs-1");
        store.fail_file_insert = true;
        let docs = MemDocs::default();
        let engine = SepEngine::new(&store, &docs, "sep-documents");

        let outcome = engine
            .create("user-1", valid_data(), vec![pdf_attachment("sep.pdf")])
            .await
            .unwrap();

        // Primary record succeeded, attachment did not, and no orphan bytes
        // remain in storage.
        assert!(outcome.uploaded.is_empty());
        assert!(docs.objects.lock().unwrap().is_empty());
        assert_eq!(store.registrasi.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_patient_not_rolled_back_on_registration_failure() {
        let mut store = MemStore::with_profile("user-1", "rs-1");
        store.fail_registrasi_insert = true;
        let docs = MemDocs::default();
        let engine = SepEngine::new(&store, &docs, "sep-documents");

        let err = engine.create("user-1", valid_data(), vec![]).await.unwrap_err();
        assert_eq!(err.status(), 500);
        // Known gap preserved: the patient/doctor rows survive the failure.
        assert_eq!(store.pasien.lock().unwrap().len(), 1);
        assert_eq!(store.dokter.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_storage_path_shape() {
        let path = derive_storage_path("reg-9", "Resume Medis.PDF");
        assert!(path.starts_with("registrasi/reg-9/reg-9_"));
        assert!(path.ends_with(".pdf"));
    }

    #[test]
    fn test_storage_path_without_extension() {
        let path = derive_storage_path("reg-9", "resume");
        assert!(path.starts_with("registrasi/reg-9/reg-9_"));
        assert!(!path.contains('.'));
    }
}
