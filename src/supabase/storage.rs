//! Object storage: upload, download, remove, public URL.
//!
//! Objects live under hierarchical paths inside a bucket
//! (`registrasi/{registrasi_id}/{filename}`). Uploads never overwrite; the
//! path carries a uniqueness token so collisions cannot happen by
//! construction.

use super::SupabaseClient;
use crate::error::AppError;

impl SupabaseClient {
    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.config.url, bucket, path)
    }

    /// Upload raw bytes. `x-upsert` stays off so an existing object is an
    /// error rather than a silent replace.
    pub async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        let resp = self
            .service_auth(self.http().post(self.object_url(bucket, path)))
            .header("Content-Type", content_type)
            .header("Cache-Control", "3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Upload to {} failed: {}", path, e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "Upload to {}/{} failed ({}): {}",
                bucket, path, status, body
            )));
        }
        Ok(())
    }

    /// Download an object's bytes.
    pub async fn download_object(&self, bucket: &str, path: &str) -> Result<Vec<u8>, AppError> {
        let resp = self
            .service_auth(self.http().get(self.object_url(bucket, path)))
            .send()
            .await
            .map_err(|_| AppError::upstream(format!("Gagal download file: {}", path)))?;

        if !resp.status().is_success() {
            return Err(AppError::upstream(format!("Gagal download file: {}", path)));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|_| AppError::upstream(format!("Gagal download file: {}", path)))?;
        Ok(bytes.to_vec())
    }

    /// Remove an object. Used both by explicit deletes and by the upload
    /// path's orphan cleanup.
    pub async fn remove_object(&self, bucket: &str, path: &str) -> Result<(), AppError> {
        let resp = self
            .service_auth(self.http().delete(self.object_url(bucket, path)))
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Remove of {} failed: {}", path, e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(AppError::upstream(format!(
                "Remove of {}/{} failed ({})",
                bucket, path, status
            )));
        }
        Ok(())
    }

    /// Public URL for an object in a public bucket.
    pub fn object_public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.url, bucket, path
        )
    }
}
