//! Split upload of large files to a PUT-only object store.
//!
//! Files above the chunk threshold are cut into fixed-size chunks,
//! uploaded one at a time, and described by a newline-joined manifest
//! object. A later combine run on the store host reads the manifest and
//! reassembles the original bytes.

mod chunked;
mod manifest;
mod upload;
mod validation;

pub use chunked::ChunkReader;
pub use manifest::{MANIFEST_SUFFIX, Manifest, chunk_path, manifest_path};
pub use upload::{UploadEvent, UploadOutcome, Uploader};
pub use validation::validate_remote_path;

/// Chunk threshold and chunk size: 100 MB.
///
/// Files at or below this size are uploaded whole; larger files are
/// split into chunks of exactly this many bytes, the last one shorter.
pub const DEFAULT_CHUNK_SIZE: u64 = 100_000_000;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] shardput_store::StoreError),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
}
