//! Claim-registration commands.
//!
//! `create_sep` and `tambah_sep` run the same workflow but keep their
//! historical payload and response shapes. Workflow failures come back as
//! an envelope with the matching status class, not as a command error.

use super::AppState;
use crate::files::SEP_BUCKET;
use crate::models::Registrasi;
use crate::sep::{
    sep_created_body, tambah_created_body, Attachment, SepData, SepEngine, SepResponse,
    SupabaseSepStore,
};
use base64::Engine;
use serde::Deserialize;
use tauri::State;

/// Base64 file payload as sent by the webview.
#[derive(Debug, Deserialize)]
pub struct FilePayload {
    pub name: String,
    #[serde(default)]
    pub tipe: Option<String>,
    pub data: String,
}

impl FilePayload {
    pub fn into_attachment(self) -> Result<Attachment, String> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| format!("File {} bukan base64 yang valid: {}", self.name, e))?;
        let content_type = match self.tipe {
            Some(t) if !t.is_empty() => t,
            _ => mime_guess::from_path(&self.name)
                .first_or_octet_stream()
                .to_string(),
        };
        Ok(Attachment {
            name: self.name,
            content_type,
            bytes,
        })
    }
}

/// Decode payloads, dropping any that are not valid base64. Attachment
/// failures are soft everywhere in this workflow.
fn decode_attachments(files: Vec<FilePayload>) -> Vec<Attachment> {
    files
        .into_iter()
        .filter_map(|f| match f.into_attachment() {
            Ok(attachment) => Some(attachment),
            Err(reason) => {
                tracing::warn!("[Sep] {}", reason);
                None
            }
        })
        .collect()
}

#[tauri::command]
pub async fn list_registrasi(
    refresh: Option<bool>,
    state: State<'_, AppState>,
) -> Result<Vec<Registrasi>, String> {
    if refresh.unwrap_or(false) {
        state.registrasi.invalidate().await;
    }
    let cached = state.registrasi.cached().await;
    if !cached.is_empty() {
        return Ok(cached);
    }
    Ok(state.registrasi.refresh().await?)
}

#[tauri::command]
pub async fn update_registrasi(
    id: String,
    changes: serde_json::Value,
    state: State<'_, AppState>,
) -> Result<Registrasi, String> {
    Ok(state.registrasi.update(&id, changes).await?)
}

#[tauri::command]
pub async fn delete_registrasi(id: String, state: State<'_, AppState>) -> Result<(), String> {
    Ok(state.registrasi.delete(&id).await?)
}

/// Flat-payload claim creation: credentials and fields side by side.
#[tauri::command]
pub async fn create_sep(
    email: String,
    password: String,
    data: SepData,
    files: Vec<FilePayload>,
    state: State<'_, AppState>,
) -> Result<SepResponse, String> {
    let session = match state.client.sign_in_with_password(&email, &password).await {
        Ok(session) => session,
        Err(e) => return Ok(SepResponse::error(&e)),
    };

    let store = SupabaseSepStore::new(state.client.clone());
    let engine = SepEngine::new(&store, state.client.as_ref(), SEP_BUCKET);

    match engine
        .create(&session.user_id, data, decode_attachments(files))
        .await
    {
        Ok(outcome) => {
            state.registrasi.add_to_list(outcome.registrasi.clone()).await;
            Ok(SepResponse::created(sep_created_body(&outcome)))
        }
        Err(e) => Ok(SepResponse::error(&e)),
    }
}

/// Auth-block claim creation payload.
#[derive(Debug, Deserialize)]
pub struct TambahSepPayload {
    pub email: String,
    pub password: String,
    pub sep: SepData,
    #[serde(default)]
    pub files: Vec<FilePayload>,
}

#[tauri::command]
pub async fn tambah_sep(
    payload: TambahSepPayload,
    state: State<'_, AppState>,
) -> Result<SepResponse, String> {
    let session = match state
        .client
        .sign_in_with_password(&payload.email, &payload.password)
        .await
    {
        Ok(session) => session,
        Err(e) => return Ok(SepResponse::error(&e)),
    };

    let store = SupabaseSepStore::new(state.client.clone());
    let engine = SepEngine::new(&store, state.client.as_ref(), SEP_BUCKET);

    match engine
        .create(&session.user_id, payload.sep, decode_attachments(payload.files))
        .await
    {
        Ok(outcome) => {
            state.registrasi.add_to_list(outcome.registrasi.clone()).await;
            Ok(SepResponse::created(tambah_created_body(&outcome)))
        }
        Err(e) => Ok(SepResponse::error(&e)),
    }
}
