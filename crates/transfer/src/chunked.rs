use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{DEFAULT_CHUNK_SIZE, TransferError};

/// Reads a file sequentially in fixed-size chunks.
///
/// All reads come from a single open handle, so chunk boundaries are
/// exact and non-overlapping: chunk `i` holds bytes
/// `[i * chunk_size, min((i + 1) * chunk_size, file_size))`.
pub struct ChunkReader {
    file: File,
    chunk_size: u64,
    offset: u64,
    file_size: u64,
}

impl ChunkReader {
    /// Opens `path` for chunked reading.
    ///
    /// If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] is used.
    pub fn new(path: &Path, chunk_size: u64) -> Result<Self, TransferError> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Ok(Self {
            file,
            chunk_size,
            offset: 0,
            file_size,
        })
    }

    /// Reads the next chunk. Returns `None` at EOF.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransferError> {
        let remaining = self.file_size.saturating_sub(self.offset);
        if remaining == 0 {
            return Ok(None);
        }

        let read_size = remaining.min(self.chunk_size) as usize;
        let mut buf = vec![0u8; read_size];
        self.file.read_exact(&mut buf)?;
        self.offset += read_size as u64;
        Ok(Some(buf))
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Number of chunks this file splits into.
    pub fn chunk_count(&self) -> u64 {
        self.file_size.div_ceil(self.chunk_size)
    }

    /// Bytes remaining to read.
    pub fn remaining(&self) -> u64 {
        self.file_size.saturating_sub(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn create_test_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(data).unwrap();
        path
    }

    #[test]
    fn reads_exact_slices_in_order() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "test.bin", b"AABBCCDDEE");

        let mut reader = ChunkReader::new(&path, 4).unwrap();
        assert_eq!(reader.file_size(), 10);
        assert_eq!(reader.chunk_count(), 3);

        assert_eq!(reader.next_chunk().unwrap().unwrap(), b"AABB");
        assert_eq!(reader.remaining(), 6);
        assert_eq!(reader.next_chunk().unwrap().unwrap(), b"CCDD");
        assert_eq!(reader.next_chunk().unwrap().unwrap(), b"EE");
        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn file_size_equal_to_chunk_size_is_one_chunk() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "test.bin", b"1234");

        let mut reader = ChunkReader::new(&path, 4).unwrap();
        assert_eq!(reader.chunk_count(), 1);
        assert_eq!(reader.next_chunk().unwrap().unwrap(), b"1234");
        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn one_byte_over_threshold_yields_two_chunks() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "test.bin", b"12345");

        let mut reader = ChunkReader::new(&path, 4).unwrap();
        assert_eq!(reader.chunk_count(), 2);
        assert_eq!(reader.next_chunk().unwrap().unwrap(), b"1234");
        assert_eq!(reader.next_chunk().unwrap().unwrap(), b"5");
        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn empty_file_has_no_chunks() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "empty.bin", b"");

        let mut reader = ChunkReader::new(&path, 4).unwrap();
        assert_eq!(reader.file_size(), 0);
        assert_eq!(reader.chunk_count(), 0);
        assert!(reader.next_chunk().unwrap().is_none());
    }

    #[test]
    fn zero_chunk_size_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "test.bin", b"x");

        let reader = ChunkReader::new(&path, 0).unwrap();
        assert_eq!(reader.chunk_count(), 1);
    }
}
