//! Uploading supporting documents to an existing registration.
//!
//! Unlike the claim workflow's attachment pass, an explicit upload is
//! all-or-nothing from the user's point of view: the first failure aborts
//! the batch and surfaces an error. Files go up sequentially and progress
//! is reported after each one.

use crate::error::AppError;
use crate::models::{NewRegistrasiFile, RegistrasiFile};
use crate::sep::{derive_storage_path, Attachment, DocumentStore, SepStore};

pub struct FileUploader<'a> {
    store: &'a dyn SepStore,
    documents: &'a dyn DocumentStore,
    bucket: &'a str,
}

impl<'a> FileUploader<'a> {
    pub fn new(store: &'a dyn SepStore, documents: &'a dyn DocumentStore, bucket: &'a str) -> Self {
        Self {
            store,
            documents,
            bucket,
        }
    }

    /// Upload `files` one by one, recording a metadata row per stored
    /// object. `on_progress` receives the percentage of files completed.
    /// If a metadata insert fails, the just-uploaded bytes are deleted
    /// before the error propagates.
    pub async fn upload_files(
        &self,
        registrasi_id: &str,
        files: Vec<Attachment>,
        mut on_progress: impl FnMut(u8) + Send,
    ) -> Result<Vec<RegistrasiFile>, AppError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let total = files.len();
        let mut uploaded = Vec::with_capacity(total);

        for (index, file) in files.into_iter().enumerate() {
            let path = derive_storage_path(registrasi_id, &file.name);

            self.documents
                .upload(self.bucket, &path, file.bytes, &file.content_type)
                .await
                .map_err(|e| AppError::upstream(format!("Gagal upload file {}: {}", file.name, e)))?;

            let record = match self
                .store
                .insert_registrasi_file(NewRegistrasiFile {
                    registrasi_id: registrasi_id.to_string(),
                    nama_file: file.name.clone(),
                    path_file: path.clone(),
                    tipe: Some(if file.content_type.is_empty() {
                        "application/octet-stream".to_string()
                    } else {
                        file.content_type.clone()
                    }),
                })
                .await
            {
                Ok(record) => record,
                Err(e) => {
                    // Metadata insert failed: remove the stored bytes so the
                    // object does not become unreachable garbage.
                    if let Err(cleanup) = self.documents.remove(self.bucket, &path).await {
                        tracing::warn!("[Upload] Orphan cleanup failed for {}: {}", path, cleanup);
                    }
                    return Err(AppError::upstream(format!(
                        "Gagal menyimpan info file {}: {}",
                        file.name, e
                    )));
                }
            };

            uploaded.push(record);
            on_progress((((index + 1) * 100) / total) as u8);
        }

        Ok(uploaded)
    }

    /// Delete a document: stored bytes first, then the metadata row.
    pub async fn delete_file(&self, file_id: &str, path: &str) -> Result<(), AppError> {
        self.documents
            .remove(self.bucket, path)
            .await
            .map_err(|e| AppError::upstream(format!("Gagal menghapus file dari storage: {}", e)))?;
        self.store
            .delete_registrasi_file(file_id)
            .await
            .map_err(|e| AppError::upstream(format!("Gagal menghapus record file: {}", e)))
    }

    pub fn file_url(&self, path: &str) -> String {
        self.documents.public_url(self.bucket, path)
    }

    /// Fetch a document's bytes for saving to disk.
    pub async fn download_file(&self, path: &str) -> Result<Vec<u8>, AppError> {
        self.documents.download(self.bucket, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Dokter, NewDokter, NewPasien, NewRegistrasi, Pasien, Registrasi,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FileStore {
        rows: Mutex<Vec<RegistrasiFile>>,
        fail_insert: bool,
    }

    #[async_trait]
    impl SepStore for FileStore {
        async fn rumah_sakit_for_user(&self, _user_id: &str) -> Result<Option<String>, AppError> {
            Ok(None)
        }

        async fn upsert_pasien(&self, _data: NewPasien) -> Result<Pasien, AppError> {
            unreachable!("not used by uploads")
        }

        async fn upsert_dokter(&self, _data: NewDokter) -> Result<Dokter, AppError> {
            unreachable!("not used by uploads")
        }

        async fn insert_registrasi(&self, _data: NewRegistrasi) -> Result<Registrasi, AppError> {
            unreachable!("not used by uploads")
        }

        async fn insert_registrasi_file(
            &self,
            data: NewRegistrasiFile,
        ) -> Result<RegistrasiFile, AppError> {
            if self.fail_insert {
                return Err(AppError::upstream("insert failed"));
            }
            let mut rows = self.rows.lock().unwrap();
            let row = RegistrasiFile {
                id: format!("file-{}", rows.len() + 1),
                registrasi_id: data.registrasi_id,
                nama_file: data.nama_file,
                path_file: data.path_file,
                tipe: data.tipe,
                created_at: None,
            };
            rows.push(row.clone());
            Ok(row)
        }

        async fn files_for_registrasi(
            &self,
            _registrasi_id: &str,
        ) -> Result<Vec<RegistrasiFile>, AppError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn delete_registrasi_file(&self, file_id: &str) -> Result<(), AppError> {
            self.rows.lock().unwrap().retain(|f| f.id != file_id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Docs {
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl DocumentStore for Docs {
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
                .ok_or_else(|| AppError::upstream("missing object"))
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

    fn attachment(name: &str, content_type: &str) -> Attachment {
        Attachment {
            name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![1u8; 64],
        }
    }

    #[tokio::test]
    async fn test_upload_roundtrip_keeps_name_and_type() {
        let store = FileStore::default();
        let docs = Docs::default();
        let uploader = FileUploader::new(&store, &docs, "sep-documents");

        uploader
            .upload_files(
                "reg-1",
                vec![attachment("Resume Medis.pdf", "application/pdf")],
                |_| {},
            )
            .await
            .unwrap();

        let listed = store.files_for_registrasi("reg-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].nama_file, "Resume Medis.pdf");
        assert_eq!(listed[0].tipe.as_deref(), Some("application/pdf"));
    }

    #[tokio::test]
    async fn test_progress_is_fractional_per_file() {
        let store = FileStore::default();
        let docs = Docs::default();
        let uploader = FileUploader::new(&store, &docs, "sep-documents");

        let mut seen = Vec::new();
        uploader
            .upload_files(
                "reg-1",
                vec![
                    attachment("a.pdf", "application/pdf"),
                    attachment("b.pdf", "application/pdf"),
                    attachment("c.pdf", "application/pdf"),
                ],
                |pct| seen.push(pct),
            )
            .await
            .unwrap();

        assert_eq!(seen, vec![33, 66, 100]);
    }

    #[tokio::test]
    async fn test_metadata_failure_aborts_and_cleans_up() {
        let store = FileStore {
            fail_insert: true,
            ..Default::default()
        };
        let docs = Docs::default();
        let uploader = FileUploader::new(&store, &docs, "sep-documents");

        let err = uploader
            .upload_files("reg-1", vec![attachment("a.pdf", "application/pdf")], |_| {})
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Gagal menyimpan info file"));
        assert!(docs.objects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_bytes_then_row() {
        let store = FileStore::default();
        let docs = Docs::default();
        let uploader = FileUploader::new(&store, &docs, "sep-documents");

        let uploaded = uploader
            .upload_files("reg-1", vec![attachment("a.pdf", "application/pdf")], |_| {})
            .await
            .unwrap();

        uploader
            .delete_file(&uploaded[0].id, &uploaded[0].path_file)
            .await
            .unwrap();

        assert!(docs.objects.lock().unwrap().is_empty());
        assert!(store.rows.lock().unwrap().is_empty());
    }
}
