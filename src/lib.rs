mod analysis;
mod commands;
mod credentials;
mod db;
mod error;
mod files;
mod models;
mod sep;
mod supabase;

use commands::*;
use std::sync::Arc;
use supabase::{SupabaseClient, SupabaseConfig};
use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Load .env file - try multiple locations
    // During `tauri dev`, CWD is project root; check current dir first
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }

    // Initialize tracing with RUST_LOG env filter
    // Use RUST_LOG=debug for verbose per-operation logs
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,dextra_sep_lib=info")),
        )
        .init();

    let config = SupabaseConfig::from_env().unwrap_or_else(|e| {
        tracing::error!("Store configuration missing: {}", e);
        std::process::exit(1);
    });
    let client = SupabaseClient::new(config).unwrap_or_else(|e| {
        tracing::error!("Failed to create store client: {}", e);
        std::process::exit(1);
    });
    let client = Arc::new(client);

    let app_state = AppState::new(client);
    let analysis_state = AnalysisState::default();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_fs::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(app_state)
        .manage(analysis_state)
        .invoke_handler(tauri::generate_handler![
            // Auth
            login,
            // Credentials
            set_api_key,
            delete_api_key,
            get_configured_providers,
            // Master data
            list_rumah_sakit,
            create_rumah_sakit,
            update_rumah_sakit,
            delete_rumah_sakit,
            list_pasien,
            create_pasien,
            update_pasien,
            delete_pasien,
            list_dokter,
            create_dokter,
            update_dokter,
            delete_dokter,
            // Registrations
            list_registrasi,
            update_registrasi,
            delete_registrasi,
            create_sep,
            tambah_sep,
            // Documents
            list_registrasi_files,
            upload_registrasi_files,
            delete_registrasi_file,
            get_file_url,
            download_registrasi_file,
            merge_registrasi_files,
            // Analysis
            analyze_document,
            ask_document_question,
            get_analysis_transcript,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
