//! Claim registrations, listed newest-first with patient, doctor, and
//! hospital embedded.
//!
//! Creation goes through the claim workflow, not this repository; a freshly
//! created registration is pushed into the mirror with `add_to_list`.

use super::RUMAH_SAKIT_EMBED;
use crate::error::AppError;
use crate::models::Registrasi;
use crate::supabase::{Query, SupabaseClient};
use std::sync::Arc;
use tokio::sync::RwLock;

const TABLE: &str = "registrasi";

fn select_with_embed() -> String {
    format!(
        "*,pasien:pasien_id(id,rumah_sakit_id,nama,nik,no_kartu_bpjs,tgl_lahir,jenis_kelamin),\
         dokter:dokter_id(id,rumah_sakit_id,nama,spesialisasi),{}",
        RUMAH_SAKIT_EMBED
    )
}

pub struct RegistrasiRepo {
    client: Arc<SupabaseClient>,
    cache: RwLock<Vec<Registrasi>>,
}

impl RegistrasiRepo {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            client,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Refetch all registrations (newest first) and replace the mirror.
    pub async fn refresh(&self) -> Result<Vec<Registrasi>, AppError> {
        let rows: Vec<Registrasi> = self
            .client
            .select(
                TABLE,
                &Query::select(select_with_embed()).order("created_at.desc"),
            )
            .await?;
        *self.cache.write().await = rows.clone();
        Ok(rows)
    }

    pub async fn cached(&self) -> Vec<Registrasi> {
        self.cache.read().await.clone()
    }

    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }

    /// Prepend a registration created by the claim workflow.
    pub async fn add_to_list(&self, registrasi: Registrasi) {
        self.cache.write().await.insert(0, registrasi);
    }

    /// Patch status fields (or the merged-file reference) on one row.
    pub async fn update(
        &self,
        id: &str,
        changes: serde_json::Value,
    ) -> Result<Registrasi, AppError> {
        let row: Registrasi = self
            .client
            .update(TABLE, &select_with_embed(), id, &changes)
            .await?;
        let mut cache = self.cache.write().await;
        if let Some(item) = cache.iter_mut().find(|r| r.id == id) {
            *item = row.clone();
        }
        Ok(row)
    }

    /// Delete a registration row. The store is expected to cascade to its
    /// `registrasi_file` rows; stored bytes are not touched here.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.client.delete(TABLE, id).await?;
        self.cache.write().await.retain(|r| r.id != id);
        Ok(())
    }
}
