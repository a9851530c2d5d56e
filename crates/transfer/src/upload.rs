//! The uploader: whole-file vs split decision, sequential chunk upload
//! and manifest publication.

use std::path::Path;

use shardput_store::RemoteStore;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chunked::ChunkReader;
use crate::manifest::{Manifest, chunk_path, manifest_path};
use crate::validation::validate_remote_path;
use crate::{DEFAULT_CHUNK_SIZE, TransferError};

/// Progress events emitted during an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    /// Whole-file upload finished.
    Uploaded { path: String },
    /// One chunk of a split upload was stored.
    ChunkUploaded {
        index: u64,
        total: u64,
        path: String,
    },
    /// The manifest was published; the split upload is complete.
    ManifestUploaded { path: String },
}

/// How the file ended up on the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Uploaded directly to the destination path.
    Whole,
    /// Split into chunks; a combine run on the store host finishes it.
    Split {
        manifest_path: String,
        chunk_count: u64,
    },
}

/// Uploads local files to the remote store, splitting large ones.
pub struct Uploader {
    store: RemoteStore,
    tmp_dir: String,
    chunk_size: u64,
    events: Option<mpsc::Sender<UploadEvent>>,
}

impl Uploader {
    /// Creates an uploader writing split pieces under `tmp_dir`.
    pub fn new(store: RemoteStore, tmp_dir: &str) -> Self {
        Self {
            store,
            tmp_dir: tmp_dir.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            events: None,
        }
    }

    /// Overrides the chunk threshold.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Registers a progress event channel.
    pub fn with_events(mut self, tx: mpsc::Sender<UploadEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Uploads the file at `local` so it becomes available at `dest`.
    ///
    /// Files no larger than the chunk threshold (including empty files)
    /// go up in a single PUT. Larger files are split under a fresh
    /// identifier, one chunk in flight at a time; the manifest is
    /// published only after every chunk has been stored, so its mere
    /// presence implies all listed chunks exist and are complete. A
    /// permanently failed PUT aborts the whole upload and no manifest
    /// is written.
    pub async fn upload(&self, local: &Path, dest: &str) -> Result<UploadOutcome, TransferError> {
        validate_remote_path(dest)?;

        let size = std::fs::metadata(local)?.len();
        info!(file = %local.display(), size, "file size determined");

        if size <= self.chunk_size {
            let body = std::fs::read(local)?;
            self.store.put(dest, &body).await?;
            self.emit(UploadEvent::Uploaded {
                path: dest.to_string(),
            })
            .await;
            return Ok(UploadOutcome::Whole);
        }

        let id = Uuid::new_v4().to_string();
        let mut reader = ChunkReader::new(local, self.chunk_size)?;
        let total = reader.chunk_count();
        info!(split_id = %id, chunks = total, "splitting into chunks");

        let mut manifest = Manifest::new(dest);
        let mut index = 0u64;
        while let Some(chunk) = reader.next_chunk()? {
            let path = chunk_path(&self.tmp_dir, &id, index);
            self.store.put(&path, &chunk).await?;
            manifest.push_chunk(path.clone());
            debug!(index, total, "chunk stored");
            self.emit(UploadEvent::ChunkUploaded { index, total, path }).await;
            index += 1;
        }

        let manifest_path = manifest_path(&self.tmp_dir, &id);
        self.store
            .put(&manifest_path, manifest.render().as_bytes())
            .await?;
        self.emit(UploadEvent::ManifestUploaded {
            path: manifest_path.clone(),
        })
        .await;

        Ok(UploadOutcome::Split {
            manifest_path,
            chunk_count: total,
        })
    }

    async fn emit(&self, event: UploadEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }
}
