//! Mock engine for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::{EngineError, MediaEngine, ProbeOutput, TranscodeJob};

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Probe(PathBuf),
    VerifyDecode(PathBuf),
    Transcode(TranscodeJob),
    ExtractCover { input: PathBuf, cover: PathBuf },
    EmbedCover { cover: PathBuf, target: PathBuf },
}

impl Invocation {
    /// The input file the call was about, if any.
    pub fn input(&self) -> Option<&Path> {
        match self {
            Self::Probe(path) | Self::VerifyDecode(path) => Some(path),
            Self::Transcode(job) => Some(&job.input_path),
            Self::ExtractCover { input, .. } => Some(input),
            Self::EmbedCover { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    invocations: Vec<Invocation>,
    probe_texts: HashMap<PathBuf, String>,
    invalid: HashSet<PathBuf>,
    corrupt: HashSet<PathBuf>,
    failing_transcodes: HashSet<PathBuf>,
    without_cover: HashSet<PathBuf>,
    toolchain_missing: bool,
}

/// Mock implementation of the MediaEngine trait.
///
/// Provides controllable behavior for testing:
/// - Record every invocation for assertions
/// - Script probe text per input
/// - Fail probe, full decode, transcode or cover extraction per input
/// - Write placeholder outputs so filesystem effects can be checked
#[derive(Debug, Clone)]
pub struct MockEngine {
    state: Arc<RwLock<MockState>>,
    cover_embedding: bool,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create a new mock engine with cover embedding available.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState::default())),
            cover_embedding: true,
        }
    }

    /// Create a mock engine without a cover-embedding tool.
    pub fn without_cover_embedding() -> Self {
        Self {
            cover_embedding: false,
            ..Self::new()
        }
    }

    /// Get all recorded invocations.
    pub async fn invocations(&self) -> Vec<Invocation> {
        self.state.read().await.invocations.clone()
    }

    /// Get the invocations that concerned one input.
    pub async fn invocations_for(&self, input: impl AsRef<Path>) -> Vec<Invocation> {
        self.invocations()
            .await
            .into_iter()
            .filter(|i| i.input() == Some(input.as_ref()))
            .collect()
    }

    /// Get every transcode job that was submitted.
    pub async fn transcode_jobs(&self) -> Vec<TranscodeJob> {
        self.invocations()
            .await
            .into_iter()
            .filter_map(|i| match i {
                Invocation::Transcode(job) => Some(job),
                _ => None,
            })
            .collect()
    }

    /// Set the probe diagnostics for a specific path.
    pub async fn set_probe_text(&self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.state
            .write()
            .await
            .probe_texts
            .insert(path.as_ref().to_path_buf(), text.into());
    }

    /// Make the probe reject a file.
    pub async fn mark_invalid(&self, path: impl AsRef<Path>) {
        self.state.write().await.invalid.insert(path.as_ref().to_path_buf());
    }

    /// Make the full decode of a file fail.
    pub async fn mark_corrupt(&self, path: impl AsRef<Path>) {
        self.state.write().await.corrupt.insert(path.as_ref().to_path_buf());
    }

    /// Make the transcode pass of a file fail.
    pub async fn fail_transcode(&self, path: impl AsRef<Path>) {
        self.state
            .write()
            .await
            .failing_transcodes
            .insert(path.as_ref().to_path_buf());
    }

    /// Make cover extraction of a file fail, as for a book without artwork.
    pub async fn without_cover(&self, path: impl AsRef<Path>) {
        self.state
            .write()
            .await
            .without_cover
            .insert(path.as_ref().to_path_buf());
    }

    /// Make every call fail as if the executables were uninstalled.
    pub async fn set_toolchain_missing(&self, missing: bool) {
        self.state.write().await.toolchain_missing = missing;
    }

    async fn record(&self, invocation: Invocation) -> Result<(), EngineError> {
        let mut state = self.state.write().await;
        if state.toolchain_missing {
            return Err(EngineError::ToolNotFound {
                tool: "ffmpeg".to_string(),
                path: PathBuf::from("ffmpeg"),
            });
        }
        state.invocations.push(invocation);
        Ok(())
    }
}

#[async_trait]
impl MediaEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, input: &Path) -> Result<ProbeOutput, EngineError> {
        self.record(Invocation::Probe(input.to_path_buf())).await?;

        let state = self.state.read().await;
        if state.invalid.contains(input) {
            return Ok(ProbeOutput {
                success: false,
                exit_code: Some(1),
                diagnostics: format!("{}: Invalid data found when processing input\n", input.display()),
            });
        }

        Ok(ProbeOutput {
            success: true,
            exit_code: Some(0),
            diagnostics: state.probe_texts.get(input).cloned().unwrap_or_default(),
        })
    }

    async fn verify_decode(&self, input: &Path) -> Result<bool, EngineError> {
        self.record(Invocation::VerifyDecode(input.to_path_buf())).await?;
        Ok(!self.state.read().await.corrupt.contains(input))
    }

    async fn transcode(&self, job: &TranscodeJob) -> Result<(), EngineError> {
        self.record(Invocation::Transcode(job.clone())).await?;

        if self.state.read().await.failing_transcodes.contains(&job.input_path) {
            return Err(EngineError::invocation_failed(
                "ffmpeg",
                "exited with code: Some(1)",
                Some("Error while decoding stream".to_string()),
            ));
        }

        tokio::fs::write(&job.output_path, b"mock audio").await?;
        Ok(())
    }

    async fn extract_cover(&self, input: &Path, cover_path: &Path) -> Result<(), EngineError> {
        self.record(Invocation::ExtractCover {
            input: input.to_path_buf(),
            cover: cover_path.to_path_buf(),
        })
        .await?;

        if self.state.read().await.without_cover.contains(input) {
            return Err(EngineError::cover_art_failed("no video stream"));
        }

        tokio::fs::write(cover_path, b"\xff\xd8\xff\xe0mock jpeg").await?;
        Ok(())
    }

    async fn embed_cover(&self, cover_path: &Path, target: &Path) -> Result<(), EngineError> {
        self.record(Invocation::EmbedCover {
            cover: cover_path.to_path_buf(),
            target: target.to_path_buf(),
        })
        .await?;

        if !self.cover_embedding {
            return Err(EngineError::cover_art_failed("no cover-embedding tool available"));
        }
        Ok(())
    }

    fn can_embed_cover(&self) -> bool {
        self.cover_embedding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AudioCodec, EmbeddedMetadata};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_probe_scripted_text() {
        let engine = MockEngine::new();
        engine.set_probe_text("/books/a.aax", "title: A\n").await;

        let probe = engine.probe(Path::new("/books/a.aax")).await.unwrap();
        assert!(probe.success);
        assert_eq!(probe.diagnostics, "title: A\n");
    }

    #[tokio::test]
    async fn test_invalid_and_corrupt() {
        let engine = MockEngine::new();
        engine.mark_invalid("/books/a.aax").await;
        engine.mark_corrupt("/books/b.aax").await;

        assert!(!engine.probe(Path::new("/books/a.aax")).await.unwrap().success);
        assert!(!engine.verify_decode(Path::new("/books/b.aax")).await.unwrap());
        assert!(engine.verify_decode(Path::new("/books/a.aax")).await.unwrap());
    }

    #[tokio::test]
    async fn test_transcode_writes_output() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new();
        let job = TranscodeJob {
            input_path: PathBuf::from("/books/a.aax"),
            output_path: dir.path().join("a.m4a"),
            codec: AudioCodec::Copy,
            bitrate: None,
            metadata: EmbeddedMetadata::default(),
        };

        engine.transcode(&job).await.unwrap();
        assert!(job.output_path.exists());
        assert_eq!(engine.transcode_jobs().await, vec![job]);
    }

    #[tokio::test]
    async fn test_toolchain_missing() {
        let engine = MockEngine::new();
        engine.set_toolchain_missing(true).await;

        let err = engine.probe(Path::new("/books/a.aax")).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(engine.invocations().await.is_empty());
    }
}
