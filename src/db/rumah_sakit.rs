//! Hospital master data.

use crate::error::AppError;
use crate::models::{NewRumahSakit, RumahSakit};
use crate::supabase::{Query, SupabaseClient};
use std::sync::Arc;
use tokio::sync::RwLock;

const TABLE: &str = "rumah_sakit";

pub struct RumahSakitRepo {
    client: Arc<SupabaseClient>,
    cache: RwLock<Vec<RumahSakit>>,
}

impl RumahSakitRepo {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            client,
            cache: RwLock::new(Vec::new()),
        }
    }

    /// Refetch all hospitals (ordered by name) and replace the mirror.
    pub async fn refresh(&self) -> Result<Vec<RumahSakit>, AppError> {
        let rows: Vec<RumahSakit> = self
            .client
            .select(TABLE, &Query::select("*").order("nama"))
            .await?;
        *self.cache.write().await = rows.clone();
        Ok(rows)
    }

    pub async fn cached(&self) -> Vec<RumahSakit> {
        self.cache.read().await.clone()
    }

    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }

    pub async fn create(&self, data: NewRumahSakit) -> Result<RumahSakit, AppError> {
        let row: RumahSakit = self.client.insert(TABLE, "*", &data).await?;
        self.cache.write().await.push(row.clone());
        Ok(row)
    }

    pub async fn update(
        &self,
        id: &str,
        changes: serde_json::Value,
    ) -> Result<RumahSakit, AppError> {
        let row: RumahSakit = self.client.update(TABLE, "*", id, &changes).await?;
        let mut cache = self.cache.write().await;
        if let Some(item) = cache.iter_mut().find(|r| r.id == id) {
            *item = row.clone();
        }
        Ok(row)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.client.delete(TABLE, id).await?;
        self.cache.write().await.retain(|r| r.id != id);
        Ok(())
    }
}
