//! Trait definitions for the engine module.

use async_trait::async_trait;
use std::path::Path;

use super::error::EngineError;
use super::types::{ProbeOutput, TranscodeJob};

/// The external decode/encode toolchain.
///
/// Every call blocks until the underlying process exits. Implementations hold
/// the activation secret; callers never pass it around.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Runs the probe entry point and captures its diagnostic text.
    ///
    /// A probe that runs but rejects the file is `Ok` with `success == false`;
    /// `Err` means the probe could not be run at all.
    async fn probe(&self, input: &Path) -> Result<ProbeOutput, EngineError>;

    /// Decodes the whole file without writing output.
    ///
    /// Returns whether the decode succeeded.
    async fn verify_decode(&self, input: &Path) -> Result<bool, EngineError>;

    /// Runs the audio transcode pass.
    async fn transcode(&self, job: &TranscodeJob) -> Result<(), EngineError>;

    /// Copies the embedded cover image stream into `cover_path`.
    async fn extract_cover(&self, input: &Path, cover_path: &Path) -> Result<(), EngineError>;

    /// Embeds `cover_path` into `target` in place.
    async fn embed_cover(&self, cover_path: &Path, target: &Path) -> Result<(), EngineError>;

    /// Whether a cover-embedding tool is available.
    fn can_embed_cover(&self) -> bool;
}
