//! Supporting-document handling: upload, delete, download, and
//! merge-and-download.

mod merge;
mod upload;

pub use merge::{merge_documents, merge_sep_documents, merged_file_name, MergedDocument};
pub use upload::FileUploader;

/// Bucket holding registration documents.
pub const SEP_BUCKET: &str = "sep-documents";
