//! Tauri command surface.
//!
//! Commands return `Result<T, String>`; errors cross the bridge as flat
//! strings. Long-lived handles (the store client and the per-entity
//! repositories) live in managed state.

pub mod analysis;
pub mod auth;
pub mod credentials;
pub mod files;
pub mod master;
pub mod sep;

pub use analysis::*;
pub use auth::*;
pub use credentials::*;
pub use files::*;
pub use master::*;
pub use sep::*;

use crate::db::{DokterRepo, PasienRepo, RegistrasiFileRepo, RegistrasiRepo, RumahSakitRepo};
use crate::supabase::SupabaseClient;
use std::sync::Arc;

/// Shared handles for the store-backed commands.
pub struct AppState {
    pub client: Arc<SupabaseClient>,
    pub rumah_sakit: RumahSakitRepo,
    pub pasien: PasienRepo,
    pub dokter: DokterRepo,
    pub registrasi: RegistrasiRepo,
    pub registrasi_file: RegistrasiFileRepo,
}

impl AppState {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            rumah_sakit: RumahSakitRepo::new(client.clone()),
            pasien: PasienRepo::new(client.clone()),
            dokter: DokterRepo::new(client.clone()),
            registrasi: RegistrasiRepo::new(client.clone()),
            registrasi_file: RegistrasiFileRepo::new(client.clone()),
            client,
        }
    }
}
