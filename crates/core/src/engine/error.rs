//! Error types for the engine module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while driving the external toolchain.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A required executable could not be found.
    #[error("{tool} not found at path: {path}")]
    ToolNotFound { tool: String, path: PathBuf },

    /// An executable exists but could not be started.
    #[error("Failed to start {tool}: {source}")]
    SpawnFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The probe entry point ran but rejected the file.
    #[error("Failed to probe media file: {reason}")]
    ProbeFailed { reason: String },

    /// An engine invocation exited unsuccessfully.
    #[error("{tool} failed: {reason}")]
    InvocationFailed {
        tool: String,
        reason: String,
        stderr: Option<String>,
    },

    /// Cover art extraction or embedding failed.
    #[error("Cover art failed: {reason}")]
    CoverArtFailed { reason: String },

    /// I/O error around an invocation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Creates a new invocation failed error with stderr output.
    pub fn invocation_failed(
        tool: impl Into<String>,
        reason: impl Into<String>,
        stderr: Option<String>,
    ) -> Self {
        Self::InvocationFailed {
            tool: tool.into(),
            reason: reason.into(),
            stderr,
        }
    }

    /// Creates a new probe failed error.
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    /// Creates a new cover art error.
    pub fn cover_art_failed(reason: impl Into<String>) -> Self {
        Self::CoverArtFailed {
            reason: reason.into(),
        }
    }

    /// Whether this error means the toolchain itself is unusable.
    ///
    /// Fatal errors stop the whole batch; everything else is scoped to the
    /// file being processed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ToolNotFound { .. } | Self::SpawnFailed { .. })
    }

    /// Install guidance for environment errors, if any applies.
    pub fn install_hint(&self) -> Option<&'static str> {
        match self {
            Self::ToolNotFound { tool, .. } if tool == "AtomicParsley" => {
                Some("Install AtomicParsley (e.g. `apt install atomicparsley`) to embed cover art")
            }
            Self::ToolNotFound { .. } => Some(
                "Install ffmpeg (which provides ffprobe), e.g. `apt install ffmpeg` or `brew install ffmpeg`",
            ),
            _ => None,
        }
    }
}
