//! Reassembly of split uploads.
//!
//! A combine run executes on the machine that serves the remote store's
//! filesystem: manifests and chunks written over HTTP are plain files
//! under a configured root. Every pending manifest in the temporary
//! area is streamed back together into its destination object; the
//! chunks and the manifest are removed only after the destination has
//! been fully written, so an interrupted run leaves everything in place
//! for the next one.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use shardput_transfer::{MANIFEST_SUFFIX, Manifest, validate_remote_path};
use tracing::{info, warn};

/// Extension appended to a manifest while a run processes it.
///
/// Claiming by rename keeps a second combine run from picking up the
/// same manifest; a claimed manifest left behind by a crashed run is
/// rediscovered on the next scan.
const CLAIMED_SUFFIX: &str = "work";

/// Errors produced while combining.
#[derive(Debug, thiserror::Error)]
pub enum CombineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad manifest pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("transfer error: {0}")]
    Transfer(#[from] shardput_transfer::TransferError),
}

/// Result of one combine run.
///
/// Manifests are independent units of work, so a run carries on past
/// individual failures and reports them here instead of aborting.
#[derive(Debug, Default)]
pub struct CombineReport {
    /// Destination paths successfully reassembled.
    pub combined: Vec<String>,
    /// Manifest files that failed, with the error text.
    pub failed: Vec<(PathBuf, String)>,
}

impl CombineReport {
    /// `true` if no manifest failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Reassembles split uploads found under `<root>/<tmp_dir>`.
pub struct Combiner {
    root: PathBuf,
    tmp_dir: String,
}

impl Combiner {
    pub fn new(root: &Path, tmp_dir: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            tmp_dir: tmp_dir.trim_end_matches('/').to_string(),
        }
    }

    /// Processes every pending manifest and returns a per-manifest report.
    ///
    /// Re-running is safe: a manifest deleted by a successful earlier
    /// run is simply no longer found, and one left by a failed or
    /// interrupted run is picked up again.
    pub fn combine(&self) -> Result<CombineReport, CombineError> {
        let mut report = CombineReport::default();

        for manifest_file in self.pending_manifests()? {
            let claimed = match self.claim(&manifest_file) {
                Ok(path) => path,
                Err(err) => {
                    warn!(
                        manifest = %manifest_file.display(),
                        error = %err,
                        "could not claim manifest, skipping"
                    );
                    continue;
                }
            };

            info!(manifest = %manifest_file.display(), "combining");
            match self.combine_one(&claimed) {
                Ok(dest) => {
                    info!(dest = %dest, "combine complete");
                    report.combined.push(dest);
                }
                Err(err) => {
                    warn!(manifest = %claimed.display(), error = %err, "combine failed");
                    report.failed.push((claimed, err.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Manifests waiting in the temporary area, including any claimed
    /// by a run that did not finish.
    fn pending_manifests(&self) -> Result<Vec<PathBuf>, CombineError> {
        let dir = self.root.join(&self.tmp_dir);
        let mut found = Vec::new();

        for pattern in [
            format!("{}/*{MANIFEST_SUFFIX}", dir.display()),
            format!("{}/*{MANIFEST_SUFFIX}.{CLAIMED_SUFFIX}", dir.display()),
        ] {
            for entry in glob::glob(&pattern)? {
                match entry {
                    Ok(path) => found.push(path),
                    Err(err) => warn!(error = %err, "unreadable directory entry"),
                }
            }
        }

        found.sort();
        Ok(found)
    }

    /// Renames the manifest to its claimed form; a no-op if it is
    /// already a leftover claim from an earlier run.
    fn claim(&self, manifest_file: &Path) -> io::Result<PathBuf> {
        if manifest_file
            .extension()
            .is_some_and(|ext| ext == CLAIMED_SUFFIX)
        {
            return Ok(manifest_file.to_path_buf());
        }

        let mut claimed = manifest_file.as_os_str().to_owned();
        claimed.push(".");
        claimed.push(CLAIMED_SUFFIX);
        let claimed = PathBuf::from(claimed);
        std::fs::rename(manifest_file, &claimed)?;
        Ok(claimed)
    }

    /// Reassembles one manifest: stream-concatenate its chunks into a
    /// temp file, persist to the destination, then clean up.
    fn combine_one(&self, manifest_file: &Path) -> Result<String, CombineError> {
        let text = std::fs::read_to_string(manifest_file)?;
        let manifest = Manifest::parse(&text)?;

        validate_remote_path(&manifest.dest)?;
        for chunk in &manifest.chunks {
            validate_remote_path(chunk)?;
        }

        // Stream chunks so the run never buffers a whole object.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        for chunk in &manifest.chunks {
            let from = self.root.join(chunk);
            let mut reader = File::open(&from)?;
            io::copy(&mut reader, tmp.as_file_mut())?;
        }

        let dest = self.root.join(&manifest.dest);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tmp.persist(&dest).map_err(|err| CombineError::Io(err.error))?;

        // Cleanup only once the destination exists in full.
        for chunk in &manifest.chunks {
            std::fs::remove_file(self.root.join(chunk))?;
        }
        std::fs::remove_file(manifest_file)?;

        Ok(manifest.dest)
    }
}
