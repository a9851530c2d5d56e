use std::path::{Component, Path};

use crate::TransferError;

/// Validates that a remote path is safe to resolve under the store root.
///
/// Destination and chunk paths travel through manifests and are later
/// joined onto a local filesystem root by the combine run, so absolute
/// paths and parent-directory traversal are rejected up front.
pub fn validate_remote_path(path: &str) -> Result<(), TransferError> {
    if path.is_empty() {
        return Err(TransferError::InvalidPath("empty path".into()));
    }

    let p = Path::new(path);
    if p.is_absolute() {
        return Err(TransferError::InvalidPath(format!(
            "absolute path not allowed: {path}"
        )));
    }

    for component in p.components() {
        match component {
            Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                return Err(TransferError::InvalidPath(format!(
                    "path escapes the store root: {path}"
                )));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_path() {
        assert!(validate_remote_path("").is_err());
    }

    #[test]
    fn rejects_parent_dir_traversal() {
        assert!(validate_remote_path("../../../etc/passwd").is_err());
        assert!(validate_remote_path("tmp/../../escape").is_err());
        assert!(validate_remote_path("..").is_err());
    }

    #[test]
    fn rejects_absolute_path() {
        assert!(validate_remote_path("/etc/passwd").is_err());
    }

    #[test]
    fn accepts_relative_paths() {
        assert!(validate_remote_path("file.bin").is_ok());
        assert!(validate_remote_path("tmp/abc-123.0").is_ok());
        assert!(validate_remote_path("data/nested/out.tar").is_ok());
        assert!(validate_remote_path("./file.bin").is_ok());
    }
}
