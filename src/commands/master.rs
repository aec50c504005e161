//! Master-data commands: hospitals, patients, doctors.
//!
//! Lists serve from the repository mirror when it is warm; `refresh: true`
//! invalidates first. Mutations go through the repositories so the mirror
//! stays consistent with the store.

use super::AppState;
use crate::models::{Dokter, NewDokter, NewPasien, NewRumahSakit, Pasien, RumahSakit};
use tauri::State;

#[tauri::command]
pub async fn list_rumah_sakit(
    refresh: Option<bool>,
    state: State<'_, AppState>,
) -> Result<Vec<RumahSakit>, String> {
    if refresh.unwrap_or(false) {
        state.rumah_sakit.invalidate().await;
    }
    let cached = state.rumah_sakit.cached().await;
    if !cached.is_empty() {
        return Ok(cached);
    }
    Ok(state.rumah_sakit.refresh().await?)
}

#[tauri::command]
pub async fn create_rumah_sakit(
    data: NewRumahSakit,
    state: State<'_, AppState>,
) -> Result<RumahSakit, String> {
    Ok(state.rumah_sakit.create(data).await?)
}

#[tauri::command]
pub async fn update_rumah_sakit(
    id: String,
    changes: serde_json::Value,
    state: State<'_, AppState>,
) -> Result<RumahSakit, String> {
    Ok(state.rumah_sakit.update(&id, changes).await?)
}

#[tauri::command]
pub async fn delete_rumah_sakit(id: String, state: State<'_, AppState>) -> Result<(), String> {
    Ok(state.rumah_sakit.delete(&id).await?)
}

#[tauri::command]
pub async fn list_pasien(
    refresh: Option<bool>,
    state: State<'_, AppState>,
) -> Result<Vec<Pasien>, String> {
    if refresh.unwrap_or(false) {
        state.pasien.invalidate().await;
    }
    let cached = state.pasien.cached().await;
    if !cached.is_empty() {
        return Ok(cached);
    }
    Ok(state.pasien.refresh().await?)
}

#[tauri::command]
pub async fn create_pasien(data: NewPasien, state: State<'_, AppState>) -> Result<Pasien, String> {
    Ok(state.pasien.create(data).await?)
}

#[tauri::command]
pub async fn update_pasien(
    id: String,
    changes: serde_json::Value,
    state: State<'_, AppState>,
) -> Result<Pasien, String> {
    Ok(state.pasien.update(&id, changes).await?)
}

#[tauri::command]
pub async fn delete_pasien(id: String, state: State<'_, AppState>) -> Result<(), String> {
    Ok(state.pasien.delete(&id).await?)
}

#[tauri::command]
pub async fn list_dokter(
    refresh: Option<bool>,
    state: State<'_, AppState>,
) -> Result<Vec<Dokter>, String> {
    if refresh.unwrap_or(false) {
        state.dokter.invalidate().await;
    }
    let cached = state.dokter.cached().await;
    if !cached.is_empty() {
        return Ok(cached);
    }
    Ok(state.dokter.refresh().await?)
}

#[tauri::command]
pub async fn create_dokter(data: NewDokter, state: State<'_, AppState>) -> Result<Dokter, String> {
    Ok(state.dokter.create(data).await?)
}

#[tauri::command]
pub async fn update_dokter(
    id: String,
    changes: serde_json::Value,
    state: State<'_, AppState>,
) -> Result<Dokter, String> {
    Ok(state.dokter.update(&id, changes).await?)
}

#[tauri::command]
pub async fn delete_dokter(id: String, state: State<'_, AppState>) -> Result<(), String> {
    Ok(state.dokter.delete(&id).await?)
}
