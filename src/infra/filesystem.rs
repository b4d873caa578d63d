//! Filesystem operations
//!
//! Thin wrappers that attach the path to I/O failures.

use std::path::Path;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a file if it exists
pub fn remove_file(path: &Path) -> Result<(), FilesystemError> {
    if path.is_file() {
        std::fs::remove_file(path).map_err(|e| FilesystemError::RemoveFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Write content to a file, creating its parent directories
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("build/linux64/build.ninja");

        write_file(&path, "rule cc\n").unwrap();
        assert_eq!(read_file(&path).unwrap(), "rule cc\n");
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.ninja");

        remove_file(&path).unwrap();
        write_file(&path, "").unwrap();
        remove_file(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_read_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = read_file(&temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, FilesystemError::ReadFile { .. }));
    }
}
