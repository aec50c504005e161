//! Claim ("SEP") creation workflow.
//!
//! One engine implements the find-or-create + attach sequence; two entry
//! points expose it with their historical request/response shapes (a flat
//! payload with optional patient/doctor detail fields, and an auth-block
//! variant with base64 file payloads).

mod response;
mod store;
mod workflow;

pub use response::{error_body, sep_created_body, tambah_created_body, SepResponse};
pub use store::{DocumentStore, SepStore, SupabaseSepStore};
pub use workflow::{Attachment, SepData, SepEngine, SepOutcome};

pub(crate) use workflow::derive_storage_path;
