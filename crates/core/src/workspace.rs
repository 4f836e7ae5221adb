//! Scratch workspace for per-file intermediates.
//!
//! One directory per process, holding the captured probe text and the
//! extracted cover image of the file currently being processed. The directory
//! is removed when the workspace is dropped, whichever way the process leaves.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;

const METADATA_FILE: &str = "metadata.txt";
const COVER_FILE: &str = "cover.jpg";
const DIR_PREFIX: &str = "bookrip-";

/// Errors from the scratch workspace.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The temporary directory could not be created.
    #[error("Failed to create scratch workspace under {parent}")]
    CreateFailed {
        parent: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A scratch file could not be removed.
    #[error("Failed to remove scratch file: {path}")]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Process-lifetime temporary directory.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: TempDir,
}

impl ScratchWorkspace {
    /// Creates the workspace under `parent`, or the system temp dir.
    pub fn create(parent: Option<&Path>) -> Result<Self, WorkspaceError> {
        let parent = parent
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);

        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir_in(&parent)
            .map_err(|source| WorkspaceError::CreateFailed { parent, source })?;

        debug!(path = %dir.path().display(), "Scratch workspace created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the probe's diagnostic text is captured.
    pub fn metadata_path(&self) -> PathBuf {
        self.dir.path().join(METADATA_FILE)
    }

    /// Where the cover image is extracted.
    pub fn cover_path(&self) -> PathBuf {
        self.dir.path().join(COVER_FILE)
    }

    /// Removes the per-file scratch files. Missing files are fine.
    pub async fn reset(&self) -> Result<(), WorkspaceError> {
        for path in [self.metadata_path(), self.cover_path()] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(WorkspaceError::CleanupFailed { path, source }),
            }
        }
        Ok(())
    }

    /// Removes the workspace now, reporting failures that drop would swallow.
    pub fn close(self) -> Result<(), WorkspaceError> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| WorkspaceError::CleanupFailed { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_in_parent() {
        let parent = TempDir::new().unwrap();
        let workspace = ScratchWorkspace::create(Some(parent.path())).unwrap();

        assert!(workspace.path().starts_with(parent.path()));
        assert!(workspace.path().is_dir());
        assert_eq!(workspace.metadata_path().parent(), Some(workspace.path()));
        assert_eq!(workspace.cover_path().file_name().unwrap(), "cover.jpg");
    }

    #[test]
    fn test_create_in_missing_parent_fails() {
        let result = ScratchWorkspace::create(Some(Path::new("/nonexistent/scratch")));
        assert!(matches!(result, Err(WorkspaceError::CreateFailed { .. })));
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let workspace = ScratchWorkspace::create(None).unwrap();
        std::fs::write(workspace.metadata_path(), "title: x").unwrap();
        std::fs::write(workspace.cover_path(), b"\xff\xd8").unwrap();

        workspace.reset().await.unwrap();
        assert!(!workspace.metadata_path().exists());
        assert!(!workspace.cover_path().exists());

        workspace.reset().await.unwrap();
    }

    #[test]
    fn test_drop_removes_directory() {
        let workspace = ScratchWorkspace::create(None).unwrap();
        let path = workspace.path().to_path_buf();
        std::fs::write(workspace.metadata_path(), "title: x").unwrap();

        drop(workspace);
        assert!(!path.exists());
    }

    #[test]
    fn test_close_removes_directory() {
        let workspace = ScratchWorkspace::create(None).unwrap();
        let path = workspace.path().to_path_buf();

        workspace.close().unwrap();
        assert!(!path.exists());
    }
}
