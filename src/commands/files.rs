//! Document commands: list, upload, delete, download, merge-and-save.

use super::sep::FilePayload;
use super::AppState;
use crate::files::{merge_sep_documents, FileUploader, SEP_BUCKET};
use crate::models::RegistrasiFile;
use crate::sep::SupabaseSepStore;
use serde::Serialize;
use std::path::Path;
use tauri::{AppHandle, Emitter, State};

#[tauri::command]
pub async fn list_registrasi_files(
    registrasi_id: String,
    state: State<'_, AppState>,
) -> Result<Vec<RegistrasiFile>, String> {
    Ok(state.registrasi_file.fetch_for(&registrasi_id).await?)
}

/// Upload a batch of documents to an existing registration. Progress is
/// emitted as `upload-progress` events (percent of files completed). The
/// batch is all-or-nothing: a bad payload or failed upload aborts it.
#[tauri::command]
pub async fn upload_registrasi_files(
    registrasi_id: String,
    files: Vec<FilePayload>,
    state: State<'_, AppState>,
    app: AppHandle,
) -> Result<Vec<RegistrasiFile>, String> {
    let attachments = files
        .into_iter()
        .map(FilePayload::into_attachment)
        .collect::<Result<Vec<_>, String>>()?;

    let store = SupabaseSepStore::new(state.client.clone());
    let uploader = FileUploader::new(&store, state.client.as_ref(), SEP_BUCKET);

    let uploaded = uploader
        .upload_files(&registrasi_id, attachments, |pct| {
            if let Err(e) = app.emit("upload-progress", pct) {
                tracing::warn!("[Upload] Failed to emit progress: {}", e);
            }
        })
        .await?;

    state.registrasi_file.add_files(uploaded.clone()).await;
    Ok(uploaded)
}

#[tauri::command]
pub async fn delete_registrasi_file(
    file_id: String,
    path: String,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let store = SupabaseSepStore::new(state.client.clone());
    let uploader = FileUploader::new(&store, state.client.as_ref(), SEP_BUCKET);
    uploader.delete_file(&file_id, &path).await?;
    state.registrasi_file.remove_from_cache(&file_id).await;
    Ok(())
}

#[tauri::command]
pub fn get_file_url(path: String, state: State<'_, AppState>) -> String {
    state.client.object_public_url(SEP_BUCKET, &path)
}

/// Fetch a document's bytes and write them to a caller-chosen path.
#[tauri::command]
pub async fn download_registrasi_file(
    path: String,
    save_path: String,
    state: State<'_, AppState>,
) -> Result<(), String> {
    let store = SupabaseSepStore::new(state.client.clone());
    let uploader = FileUploader::new(&store, state.client.as_ref(), SEP_BUCKET);
    let bytes = uploader.download_file(&path).await?;
    tokio::fs::write(&save_path, bytes)
        .await
        .map_err(|e| format!("Gagal menyimpan file ke {}: {}", save_path, e))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    pub file_name: String,
    pub page_count: usize,
    pub saved_to: String,
}

/// Merge every document of a registration into one PDF and write it into
/// `save_dir`.
#[tauri::command]
pub async fn merge_registrasi_files(
    registrasi_id: String,
    pasien_nama: String,
    save_dir: String,
    state: State<'_, AppState>,
) -> Result<MergeResult, String> {
    let store = SupabaseSepStore::new(state.client.clone());
    let merged = merge_sep_documents(
        &store,
        state.client.as_ref(),
        SEP_BUCKET,
        &registrasi_id,
        &pasien_nama,
    )
    .await?;

    let target = Path::new(&save_dir).join(&merged.file_name);
    tokio::fs::write(&target, &merged.bytes)
        .await
        .map_err(|e| format!("Gagal menyimpan file: {}", e))?;

    tracing::info!(
        "[Merge] Wrote {} ({} pages) to {}",
        merged.file_name,
        merged.page_count,
        save_dir
    );

    Ok(MergeResult {
        file_name: merged.file_name,
        page_count: merged.page_count,
        saved_to: target.to_string_lossy().into_owned(),
    })
}
