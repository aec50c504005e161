//! Doctor master data, listed with the owning hospital embedded.

use super::RUMAH_SAKIT_EMBED;
use crate::error::AppError;
use crate::models::{Dokter, NewDokter};
use crate::supabase::{Query, SupabaseClient};
use std::sync::Arc;
use tokio::sync::RwLock;

const TABLE: &str = "dokter";

fn select_with_embed() -> String {
    format!("*,{}", RUMAH_SAKIT_EMBED)
}

pub struct DokterRepo {
    client: Arc<SupabaseClient>,
    cache: RwLock<Vec<Dokter>>,
}

impl DokterRepo {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            client,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Refetch all doctors (ordered by name) and replace the mirror.
    pub async fn refresh(&self) -> Result<Vec<Dokter>, AppError> {
        let rows: Vec<Dokter> = self
            .client
            .select(TABLE, &Query::select(select_with_embed()).order("nama"))
            .await?;
        *self.cache.write().await = rows.clone();
        Ok(rows)
    }

    pub async fn cached(&self) -> Vec<Dokter> {
        self.cache.read().await.clone()
    }

    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }

    pub async fn create(&self, data: NewDokter) -> Result<Dokter, AppError> {
        let row: Dokter = self
            .client
            .insert(TABLE, &select_with_embed(), &data)
            .await?;
        self.cache.write().await.push(row.clone());
        Ok(row)
    }

    pub async fn update(&self, id: &str, changes: serde_json::Value) -> Result<Dokter, AppError> {
        let row: Dokter = self
            .client
            .update(TABLE, &select_with_embed(), id, &changes)
            .await?;
        let mut cache = self.cache.write().await;
        if let Some(item) = cache.iter_mut().find(|d| d.id == id) {
            *item = row.clone();
        }
        Ok(row)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.client.delete(TABLE, id).await?;
        self.cache.write().await.retain(|d| d.id != id);
        Ok(())
    }
}
