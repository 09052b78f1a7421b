// src/engine/io.rs
//
// I/O operations: Source enum, file loading and atomic persistence.

use crate::error::{Result, TrentError};
use memmap2::Mmap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Where encoded image bytes come from.
#[derive(Clone, Debug)]
pub enum Source {
    /// In-memory image data
    Memory(Arc<Vec<u8>>),
    /// Memory-mapped file (zero-copy access)
    Mapped(Arc<Mmap>),
}

impl Source {
    /// Map `path` into memory.
    pub fn map_file(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(TrentError::file_not_found(display));
        }
        let file = File::open(path).map_err(|e| TrentError::file_read_failed(display.clone(), e))?;
        // Safety: the file is assumed not to be truncated by another process
        // while it is being decoded.
        let mmap =
            unsafe { Mmap::map(&file).map_err(|e| TrentError::file_read_failed(display, e))? };
        Ok(Source::Mapped(Arc::new(mmap)))
    }

    /// Borrow the encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Source::Memory(data) => data.as_slice(),
            Source::Mapped(mmap) => mmap.as_ref(),
        }
    }
}

/// Write `data` to `path` through a temp file in the same directory, then
/// rename. A failure at any point leaves `path` untouched.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<u64> {
    let output_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(output_dir)
        .map_err(|e| TrentError::file_write_failed(output_dir.display().to_string(), e))?;
    let temp_path = temp_file.path().to_path_buf();

    temp_file
        .write_all(data)
        .map_err(|e| TrentError::file_write_failed(temp_path.display().to_string(), e))?;
    temp_file
        .as_file_mut()
        .sync_all()
        .map_err(|e| TrentError::file_write_failed(temp_path.display().to_string(), e))?;

    // tempfile removes the temp file if persisting fails.
    temp_file
        .persist(path)
        .map_err(|e| TrentError::file_write_failed(path.display().to_string(), e.error))?;

    Ok(data.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapped_and_memory_sources_expose_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"hello").unwrap();

        let mapped = Source::map_file(&path).unwrap();
        assert!(matches!(mapped, Source::Mapped(_)));
        assert_eq!(mapped.bytes(), b"hello");

        let memory = Source::Memory(Arc::new(b"abc".to_vec()));
        assert_eq!(memory.bytes(), b"abc");
    }

    #[test]
    fn missing_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        assert!(matches!(
            Source::map_file(&missing),
            Err(TrentError::FileNotFound { .. })
        ));
    }

    #[test]
    fn atomic_write_replaces_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        std::fs::write(&path, b"old").unwrap();
        assert_eq!(write_atomic(&path, b"new contents").unwrap(), 12);
        assert_eq!(std::fs::read(&path).unwrap(), b"new contents");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn atomic_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(
            write_atomic(&path, b"x"),
            Err(TrentError::FileWriteFailed { .. })
        ));
    }
}
