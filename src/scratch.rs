//! Per-request scratch space.
//!
//! The converter needs file-system paths, so every request stages its input
//! into a fresh directory with a randomised name and lets the converter write
//! its output next to it. The directory is a [`tempfile::TempDir`]: it is
//! removed when the [`ScratchSpace`] is dropped, including when the request
//! future is cancelled.
//!
//! [`sweep_stale`] covers the one case drop cannot: a process that died
//! mid-request.

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Prefix of every scratch directory this crate creates.
pub const SCRATCH_PREFIX: &str = "pdf2word-";

const INPUT_FILE: &str = "input.pdf";

/// A request-scoped directory holding the staged input and the converter output.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: Option<TempDir>,
    path: PathBuf,
    input: PathBuf,
    output: PathBuf,
}

impl ScratchSpace {
    /// Create a uniquely named scratch directory under `root`.
    pub fn create(root: &Path, target_extension: &str) -> Result<Self, ConvertError> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(root)
            .map_err(ConvertError::scratch("creating scratch directory"))?;
        let input = dir.path().join(INPUT_FILE);
        let output = dir.path().join(format!("output.{target_extension}"));
        debug!("Created scratch directory {}", dir.path().display());
        Ok(Self {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
            input,
            output,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn input_path(&self) -> &Path {
        &self.input
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Write the source document into the scratch directory.
    pub async fn stage_input(&self, bytes: &[u8]) -> Result<(), ConvertError> {
        tokio::fs::write(&self.input, bytes)
            .await
            .map_err(ConvertError::scratch("staging input"))
    }

    /// Read back what the converter produced.
    ///
    /// A missing or zero-byte file is a conversion failure, never a success.
    pub async fn read_output(&self) -> Result<Vec<u8>, ConvertError> {
        let bytes = match tokio::fs::read(&self.output).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConvertError::MissingOutput)
            }
            Err(e) => return Err(ConvertError::scratch("reading converter output")(e)),
        };
        if bytes.is_empty() {
            return Err(ConvertError::EmptyOutput);
        }
        Ok(bytes)
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => debug!("Removed scratch directory {}", path.display()),
                Err(e) => warn!("Failed to remove scratch directory {}: {}", path.display(), e),
            }
        }
    }
}

/// Remove scratch directories under `root` last modified more than
/// `older_than` ago. Returns how many were removed.
///
/// Only entries named with [`SCRATCH_PREFIX`] are touched.
pub fn sweep_stale(root: &Path, older_than: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(SCRATCH_PREFIX) {
            continue;
        }
        let meta = match entry.metadata() {
            Ok(m) if m.is_dir() => m,
            _ => continue,
        };
        let age = meta
            .modified()
            .ok()
            .and_then(|m| now.duration_since(m).ok())
            .unwrap_or_default();
        if age < older_than {
            continue;
        }
        match std::fs::remove_dir_all(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Could not remove stale scratch {}: {}", entry.path().display(), e),
        }
    }

    if removed > 0 {
        info!("Removed {} stale scratch directories from {}", removed, root.display());
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn stage_and_read_back() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::create(root.path(), "docx").unwrap();
        scratch.stage_input(b"%PDF-1.4").await.unwrap();
        assert_eq!(std::fs::read(scratch.input_path()).unwrap(), b"%PDF-1.4");
        assert!(scratch.output_path().ends_with("output.docx"));

        std::fs::write(scratch.output_path(), b"docx").unwrap();
        assert_eq!(scratch.read_output().await.unwrap(), b"docx");
    }

    #[tokio::test]
    async fn missing_and_empty_output_are_errors() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::create(root.path(), "docx").unwrap();
        assert!(matches!(
            scratch.read_output().await,
            Err(ConvertError::MissingOutput)
        ));

        std::fs::write(scratch.output_path(), b"").unwrap();
        assert!(matches!(
            scratch.read_output().await,
            Err(ConvertError::EmptyOutput)
        ));
    }

    #[test]
    fn drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::create(root.path(), "docx").unwrap();
        std::fs::write(scratch.input_path(), b"x").unwrap();
        assert_eq!(entries(root.path()), 1);
        drop(scratch);
        assert_eq!(entries(root.path()), 0);
    }

    #[test]
    fn concurrent_scratch_spaces_do_not_collide() {
        let root = tempfile::tempdir().unwrap();
        let a = ScratchSpace::create(root.path(), "docx").unwrap();
        let b = ScratchSpace::create(root.path(), "docx").unwrap();
        assert_ne!(a.input_path(), b.input_path());
        assert_eq!(a.path().parent(), Some(root.path()));
    }

    #[test]
    fn sweep_only_touches_prefixed_directories() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("pdf2word-leftover")).unwrap();
        std::fs::create_dir(root.path().join("unrelated")).unwrap();
        std::fs::write(root.path().join("pdf2word-file"), b"x").unwrap();

        let removed = sweep_stale(root.path(), Duration::ZERO).unwrap();
        assert_eq!(removed, 1);
        assert!(root.path().join("unrelated").exists());
        assert!(root.path().join("pdf2word-file").exists());
        assert!(!root.path().join("pdf2word-leftover").exists());
    }

    #[test]
    fn sweep_keeps_fresh_directories() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("pdf2word-live")).unwrap();
        let removed = sweep_stale(root.path(), Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 0);
    }
}
