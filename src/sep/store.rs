//! Store seams for the claim workflow.
//!
//! The engine talks to the remote store through these traits so its
//! sequencing and failure policy can be exercised against in-memory doubles.

use crate::error::AppError;
use crate::models::{
    Dokter, NewDokter, NewPasien, NewRegistrasi, NewRegistrasiFile, Pasien, Profile, Registrasi,
    RegistrasiFile,
};
use crate::supabase::{Query, SupabaseClient};
use async_trait::async_trait;
use std::sync::Arc;

/// Relational operations the claim workflow needs.
#[async_trait]
pub trait SepStore: Send + Sync {
    /// Hospital id from the caller's profile, if mapped.
    async fn rumah_sakit_for_user(&self, user_id: &str) -> Result<Option<String>, AppError>;

    /// Resolve a patient by (nama, rumah_sakit_id), creating it if absent.
    /// Implementations must not create a duplicate for concurrent identical
    /// calls.
    async fn upsert_pasien(&self, data: NewPasien) -> Result<Pasien, AppError>;

    /// Same contract as [`Self::upsert_pasien`], for doctors.
    async fn upsert_dokter(&self, data: NewDokter) -> Result<Dokter, AppError>;

    async fn insert_registrasi(&self, data: NewRegistrasi) -> Result<Registrasi, AppError>;

    async fn insert_registrasi_file(
        &self,
        data: NewRegistrasiFile,
    ) -> Result<RegistrasiFile, AppError>;

    /// All file rows of a registration, in store fetch order.
    async fn files_for_registrasi(
        &self,
        registrasi_id: &str,
    ) -> Result<Vec<RegistrasiFile>, AppError>;

    async fn delete_registrasi_file(&self, file_id: &str) -> Result<(), AppError>;
}

/// Object storage operations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError>;

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, AppError>;

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), AppError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Remote-store implementation.
pub struct SupabaseSepStore {
    client: Arc<SupabaseClient>,
}

impl SupabaseSepStore {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SepStore for SupabaseSepStore {
    async fn rumah_sakit_for_user(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let profile: Option<Profile> = self
            .client
            .select_first(
                "profiles",
                &Query::select("user_id,rumah_sakit_id").eq("user_id", user_id),
            )
            .await?;
        Ok(profile.and_then(|p| p.rumah_sakit_id))
    }

    async fn upsert_pasien(&self, data: NewPasien) -> Result<Pasien, AppError> {
        // Atomic insert-unless-exists on the natural key; on conflict the
        // existing row is read back.
        if let Some(created) = self
            .client
            .insert_ignore_conflict("pasien", "nama,rumah_sakit_id", &data)
            .await?
        {
            return Ok(created);
        }
        self.client
            .select_first(
                "pasien",
                &Query::select("*")
                    .eq("nama", &data.nama)
                    .eq("rumah_sakit_id", &data.rumah_sakit_id),
            )
            .await?
            .ok_or_else(|| AppError::upstream("Patient upsert returned no row"))
    }

    async fn upsert_dokter(&self, data: NewDokter) -> Result<Dokter, AppError> {
        if let Some(created) = self
            .client
            .insert_ignore_conflict("dokter", "nama,rumah_sakit_id", &data)
            .await?
        {
            return Ok(created);
        }
        self.client
            .select_first(
                "dokter",
                &Query::select("*")
                    .eq("nama", &data.nama)
                    .eq("rumah_sakit_id", &data.rumah_sakit_id),
            )
            .await?
            .ok_or_else(|| AppError::upstream("Doctor upsert returned no row"))
    }

    async fn insert_registrasi(&self, data: NewRegistrasi) -> Result<Registrasi, AppError> {
        self.client.insert("registrasi", "*", &data).await
    }

    async fn insert_registrasi_file(
        &self,
        data: NewRegistrasiFile,
    ) -> Result<RegistrasiFile, AppError> {
        self.client.insert("registrasi_file", "*", &data).await
    }

    async fn files_for_registrasi(
        &self,
        registrasi_id: &str,
    ) -> Result<Vec<RegistrasiFile>, AppError> {
        self.client
            .select(
                "registrasi_file",
                &Query::select("*").eq("registrasi_id", registrasi_id),
            )
            .await
    }

    async fn delete_registrasi_file(&self, file_id: &str) -> Result<(), AppError> {
        self.client.delete("registrasi_file", file_id).await
    }
}

#[async_trait]
impl DocumentStore for SupabaseClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        self.upload_object(bucket, path, bytes, content_type).await
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, AppError> {
        self.download_object(bucket, path).await
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), AppError> {
        self.remove_object(bucket, path).await
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.object_public_url(bucket, path)
    }
}
