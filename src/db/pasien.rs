//! Patient master data, listed with the owning hospital embedded.

use super::RUMAH_SAKIT_EMBED;
use crate::error::AppError;
use crate::models::{NewPasien, Pasien};
use crate::supabase::{Query, SupabaseClient};
use std::sync::Arc;
use tokio::sync::RwLock;

const TABLE: &str = "pasien";

fn select_with_embed() -> String {
    format!("*,{}", RUMAH_SAKIT_EMBED)
}

pub struct PasienRepo {
    client: Arc<SupabaseClient>,
    cache: RwLock<Vec<Pasien>>,
}

impl PasienRepo {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            client,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Refetch all patients (ordered by name) and replace the mirror.
    pub async fn refresh(&self) -> Result<Vec<Pasien>, AppError> {
        let rows: Vec<Pasien> = self
            .client
            .select(TABLE, &Query::select(select_with_embed()).order("nama"))
            .await?;
        *self.cache.write().await = rows.clone();
        Ok(rows)
    }

    pub async fn cached(&self) -> Vec<Pasien> {
        self.cache.read().await.clone()
    }

    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }

    pub async fn create(&self, data: NewPasien) -> Result<Pasien, AppError> {
        let row: Pasien = self
            .client
            .insert(TABLE, &select_with_embed(), &data)
            .await?;
        self.cache.write().await.push(row.clone());
        Ok(row)
    }

    pub async fn update(&self, id: &str, changes: serde_json::Value) -> Result<Pasien, AppError> {
        let row: Pasien = self
            .client
            .update(TABLE, &select_with_embed(), id, &changes)
            .await?;
        let mut cache = self.cache.write().await;
        if let Some(item) = cache.iter_mut().find(|p| p.id == id) {
            *item = row.clone();
        }
        Ok(row)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.client.delete(TABLE, id).await?;
        self.cache.write().await.retain(|p| p.id != id);
        Ok(())
    }
}
