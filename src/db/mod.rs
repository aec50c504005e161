//! Per-entity data access.
//!
//! Each repository wraps the remote table API for one entity and owns a
//! local in-memory cache mirrored from the last fetch or mutation. Mutations
//! update the cache only after the remote call succeeds; `refresh` refetches
//! and `invalidate` drops the mirror.

mod dokter;
mod pasien;
mod registrasi;
mod registrasi_file;
mod rumah_sakit;

pub use dokter::DokterRepo;
pub use pasien::PasienRepo;
pub use registrasi::RegistrasiRepo;
pub use registrasi_file::RegistrasiFileRepo;
pub use rumah_sakit::RumahSakitRepo;

/// Hospital embed used by every entity that belongs to a hospital.
pub(crate) const RUMAH_SAKIT_EMBED: &str =
    "rumah_sakit:rumah_sakit_id(id,nama,alamat,kode_faskes)";
