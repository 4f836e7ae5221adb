//! External tool discovery.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::EngineError;
use crate::config::ToolsConfig;

/// Resolved paths of the external executables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    /// Transcode entry point.
    pub ffmpeg: PathBuf,
    /// Probe entry point.
    pub ffprobe: PathBuf,
    /// Cover-embedding tool, when installed.
    pub atomicparsley: Option<PathBuf>,
}

impl Toolchain {
    /// Whether cover art can be embedded into aac-family outputs.
    pub fn cover_embedding(&self) -> bool {
        self.atomicparsley.is_some()
    }
}

/// Resolves the toolchain once at startup.
pub struct ToolLocator;

impl ToolLocator {
    /// Locates every tool named in the configuration.
    ///
    /// Fails on the first missing required tool. The cover-embedding tool is
    /// optional and only turns off the capability.
    pub fn locate(config: &ToolsConfig) -> Result<Toolchain, EngineError> {
        let ffmpeg = Self::resolve("ffmpeg", &config.ffmpeg_path)?;
        let ffprobe = Self::resolve("ffprobe", &config.ffprobe_path)?;

        let atomicparsley = match Self::resolve("AtomicParsley", &config.atomicparsley_path) {
            Ok(path) => Some(path),
            Err(e) => {
                info!("{}; cover art will not be embedded", e);
                None
            }
        };

        let toolchain = Toolchain {
            ffmpeg,
            ffprobe,
            atomicparsley,
        };
        debug!(?toolchain, "Toolchain resolved");
        Ok(toolchain)
    }

    /// Resolves a bare name through `PATH`, or checks an explicit path.
    pub fn resolve(tool: &str, path: &Path) -> Result<PathBuf, EngineError> {
        which::which(path).map_err(|_| EngineError::ToolNotFound {
            tool: tool.to_string(),
            path: path.to_path_buf(),
        })
    }
}
