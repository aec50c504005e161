//! Row-filtering table API.
//!
//! Queries are built as (column, predicate) pairs and sent as URL
//! parameters; embedded relations use the `select` parameter's
//! `alias:fk_column(fields)` syntax. Mutations ask for
//! `return=representation` so the affected row comes back in one round trip.

use super::SupabaseClient;
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A select query: projection, equality filters, optional ordering.
#[derive(Debug, Clone, Default)]
pub struct Query {
    select: String,
    filters: Vec<(String, String)>,
    order: Option<String>,
}

impl Query {
    pub fn select(columns: impl Into<String>) -> Self {
        Self {
            select: columns.into(),
            ..Default::default()
        }
    }

    /// Equality predicate on a column.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), format!("eq.{}", value.into())));
        self
    }

    /// Order expression, e.g. `nama` or `created_at.desc`.
    pub fn order(mut self, expr: impl Into<String>) -> Self {
        self.order = Some(expr.into());
        self
    }

    pub(crate) fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select.clone())];
        params.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.clone()));
        }
        params
    }
}

impl SupabaseClient {
    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table)
    }

    /// Fetch all rows matching the query.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, AppError> {
        let req = self
            .service_auth(self.http().get(self.table_url(table)))
            .query(&query.params());

        let resp = req
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Query on {} failed: {}", table, e)))?;

        Self::read_rows(table, resp).await
    }

    /// Fetch the first matching row, if any. Zero rows is not an error,
    /// mirroring the store's "no rows returned" code.
    pub async fn select_first<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Option<T>, AppError> {
        let mut rows = self.select(table, query).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }

    /// Insert one row and return its stored representation, projected
    /// through `select` (so embedded relations come back with the insert).
    pub async fn insert<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        select: &str,
        row: &B,
    ) -> Result<T, AppError> {
        let resp = self
            .service_auth(self.http().post(self.table_url(table)))
            .query(&[("select", select)])
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Insert into {} failed: {}", table, e)))?;

        let mut rows: Vec<T> = Self::read_rows(table, resp).await?;
        if rows.is_empty() {
            return Err(AppError::upstream(format!(
                "Insert into {} returned no row",
                table
            )));
        }
        Ok(rows.swap_remove(0))
    }

    /// Insert unless a row with the same natural key already exists.
    ///
    /// Returns `Some(row)` when a new row was created and `None` when the
    /// insert was dropped because of a conflict on `on_conflict`; the caller
    /// then reads the existing row. The conflict resolution happens inside
    /// the store, so two concurrent identical inserts cannot both create.
    pub async fn insert_ignore_conflict<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        on_conflict: &str,
        row: &B,
    ) -> Result<Option<T>, AppError> {
        let resp = self
            .service_auth(self.http().post(self.table_url(table)))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "return=representation,resolution=ignore-duplicates")
            .json(&[row])
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Upsert into {} failed: {}", table, e)))?;

        let mut rows: Vec<T> = Self::read_rows(table, resp).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }

    /// Update the row with the given id and return its new representation.
    pub async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        select: &str,
        id: &str,
        changes: &B,
    ) -> Result<T, AppError> {
        let resp = self
            .service_auth(self.http().patch(self.table_url(table)))
            .query(&[
                ("select", select.to_string()),
                ("id", format!("eq.{}", id)),
            ])
            .header("Prefer", "return=representation")
            .json(changes)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Update on {} failed: {}", table, e)))?;

        let mut rows: Vec<T> = Self::read_rows(table, resp).await?;
        if rows.is_empty() {
            return Err(AppError::upstream(format!(
                "Update on {} matched no row (id {})",
                table, id
            )));
        }
        Ok(rows.swap_remove(0))
    }

    /// Delete the row with the given id.
    pub async fn delete(&self, table: &str, id: &str) -> Result<(), AppError> {
        let resp = self
            .service_auth(self.http().delete(self.table_url(table)))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Delete on {} failed: {}", table, e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "Delete on {} failed ({}): {}",
                table, status, body
            )));
        }
        Ok(())
    }

    async fn read_rows<T: DeserializeOwned>(
        table: &str,
        resp: reqwest::Response,
    ) -> Result<Vec<T>, AppError> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "Store error on {} ({}): {}",
                table, status, body
            )));
        }
        resp.json()
            .await
            .map_err(|e| AppError::upstream(format!("Failed to parse {} rows: {}", table, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_order() {
        let query = Query::select("*,rumah_sakit:rumah_sakit_id(id,nama)")
            .eq("rumah_sakit_id", "rs-1")
            .eq("nama", "Budi Santoso")
            .order("nama");

        let params = query.params();
        assert_eq!(params[0].0, "select");
        assert_eq!(params[1], ("rumah_sakit_id".to_string(), "eq.rs-1".to_string()));
        assert_eq!(params[2], ("nama".to_string(), "eq.Budi Santoso".to_string()));
        assert_eq!(params[3], ("order".to_string(), "nama".to_string()));
    }

    #[test]
    fn test_query_without_order() {
        let params = Query::select("path_file").eq("registrasi_id", "reg-1").params();
        assert_eq!(params.len(), 2);
    }
}
