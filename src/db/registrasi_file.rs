//! Attachment metadata for one registration at a time.
//!
//! The mirror always holds the files of the most recently fetched
//! registration (the file viewer shows one registration's documents).

use crate::error::AppError;
use crate::models::RegistrasiFile;
use crate::supabase::{Query, SupabaseClient};
use std::sync::Arc;
use tokio::sync::RwLock;

const TABLE: &str = "registrasi_file";

pub struct RegistrasiFileRepo {
    client: Arc<SupabaseClient>,
    cache: RwLock<Vec<RegistrasiFile>>,
}

impl RegistrasiFileRepo {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            client,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Fetch the files of one registration (newest first) into the mirror.
    pub async fn fetch_for(&self, registrasi_id: &str) -> Result<Vec<RegistrasiFile>, AppError> {
        let rows: Vec<RegistrasiFile> = self
            .client
            .select(
                TABLE,
                &Query::select("*")
                    .eq("registrasi_id", registrasi_id)
                    .order("created_at.desc"),
            )
            .await?;
        *self.cache.write().await = rows.clone();
        Ok(rows)
    }

    pub async fn cached(&self) -> Vec<RegistrasiFile> {
        self.cache.read().await.clone()
    }

    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }

    /// Prepend rows just persisted by the upload utility.
    pub async fn add_files(&self, files: Vec<RegistrasiFile>) {
        let mut cache = self.cache.write().await;
        for file in files.into_iter().rev() {
            cache.insert(0, file);
        }
    }

    /// Drop one row from the mirror after its storage object and metadata
    /// row were deleted.
    pub async fn remove_from_cache(&self, file_id: &str) {
        self.cache.write().await.retain(|f| f.id != file_id);
    }
}
