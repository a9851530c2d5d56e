use crate::TransferError;

/// Suffix distinguishing manifest objects in the temporary area.
pub const MANIFEST_SUFFIX: &str = ".path";

/// Ordered record of one split upload.
///
/// The wire form is newline-joined: the destination path first, then
/// every chunk path in upload order. Reassembly concatenates chunk
/// contents in exactly this order to reproduce the original file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub dest: String,
    pub chunks: Vec<String>,
}

impl Manifest {
    /// Starts a manifest for `dest` with no chunks yet.
    pub fn new(dest: &str) -> Self {
        Self {
            dest: dest.to_string(),
            chunks: Vec::new(),
        }
    }

    /// Appends the next chunk path. Call order defines reassembly order.
    pub fn push_chunk(&mut self, path: String) {
        self.chunks.push(path);
    }

    /// Renders the newline-joined wire form.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.chunks.len() + 1);
        lines.push(self.dest.as_str());
        lines.extend(self.chunks.iter().map(String::as_str));
        lines.join("\n")
    }

    /// Parses the wire form produced by [`render`](Self::render).
    ///
    /// Blank lines and surrounding whitespace are tolerated; a manifest
    /// without at least one chunk path is rejected.
    pub fn parse(text: &str) -> Result<Self, TransferError> {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

        let dest = lines
            .next()
            .ok_or_else(|| TransferError::InvalidManifest("empty manifest".into()))?;
        let chunks: Vec<String> = lines.map(str::to_string).collect();
        if chunks.is_empty() {
            return Err(TransferError::InvalidManifest(format!(
                "no chunks listed for {dest}"
            )));
        }

        Ok(Self {
            dest: dest.to_string(),
            chunks,
        })
    }
}

/// Remote path of chunk `index` for split `id`.
pub fn chunk_path(tmp_dir: &str, id: &str, index: u64) -> String {
    format!("{}/{id}.{index}", tmp_dir.trim_end_matches('/'))
}

/// Remote path of the manifest for split `id`.
pub fn manifest_path(tmp_dir: &str, id: &str) -> String {
    format!("{}/{id}{MANIFEST_SUFFIX}", tmp_dir.trim_end_matches('/'))
}
