//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EngineError;
use crate::workspace::WorkspaceError;

/// Errors that can occur while processing one file.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The input path has no usable file name.
    #[error("Input has no file name: {path}")]
    InvalidInput { path: PathBuf },

    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Relabeling the output container failed.
    #[error("Failed to rename {from} to {to}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scratch workspace cleanup failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

impl TranscodeError {
    /// Whether the whole batch must stop, regardless of failure policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Engine(e) if e.is_fatal())
    }

    /// The underlying engine error, if the engine was the cause.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}
