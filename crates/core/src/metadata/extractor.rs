//! Probe capture and key lookup.

use regex_lite::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::engine::{EngineError, MediaEngine};
use crate::workspace::ScratchWorkspace;

/// Captured probe text for one input file.
///
/// Values come back raw; run them through the sanitizer before they reach a
/// filename or an encoder argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSnapshot {
    source: PathBuf,
    text: String,
}

impl MetadataSnapshot {
    pub fn from_text(source: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    /// Reads a snapshot back from a capture file.
    pub async fn load(source: &Path, capture: &Path) -> Result<Self, EngineError> {
        let text = tokio::fs::read_to_string(capture).await?;
        Ok(Self::from_text(source, text))
    }

    /// The input file this snapshot describes.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Value of the first `key : value` occurrence, or `""` when absent.
    ///
    /// The key may sit mid-line (`..., bitrate: 64 kb/s`) but must start at a
    /// word boundary, so `artist` does not match inside `album_artist`.
    pub fn lookup(&self, key: &str) -> String {
        let pattern = format!(r"\b{}[ \t]*:[ \t]*(.*)", regex_lite::escape(key));
        let Ok(re) = Regex::new(&pattern) else {
            return String::new();
        };

        self.text
            .lines()
            .find_map(|line| re.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    /// First run of digits in the `bitrate` value (e.g. `"64"`).
    pub fn bitrate_kbps(&self) -> String {
        self.lookup("bitrate")
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect()
    }
}

/// Probes `input` and captures the diagnostic text into the workspace.
///
/// The capture file is overwritten, never appended to. A probe that cannot be
/// run is returned as a fatal engine error; a probe that rejects the file is a
/// `ProbeFailed` error scoped to this file.
pub async fn extract<E: MediaEngine + ?Sized>(
    engine: &E,
    input: &Path,
    workspace: &ScratchWorkspace,
) -> Result<MetadataSnapshot, EngineError> {
    let probe = engine.probe(input).await?;

    let capture = workspace.metadata_path();
    tokio::fs::write(&capture, &probe.diagnostics).await?;

    if !probe.success {
        return Err(EngineError::probe_failed(format!(
            "{} exited with code {:?}",
            input.display(),
            probe.exit_code
        )));
    }

    let snapshot = MetadataSnapshot::load(input, &capture).await?;
    debug!(source = %input.display(), diagnostics = snapshot.text(), "Captured probe output");
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEngine;

    const PROBE_TEXT: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'b.aax':
  Metadata:
    major_brand     : aax
    album_artist    : Narrator Name
    title           : My Book (Unabridged)
    artist          : Jane Doe
    album           : My Book (Unabridged)
    genre           : Audiobook
    date            : 2019
    copyright       : ©2019 Publisher/House
    comment         :
  Duration: 10:04:11.03, start: 0.000000, bitrate: 64 kb/s
    Chapter #0:0: start 0.000000, end 22.128000
      Metadata:
        title           : Chapter 1
";

    fn snapshot() -> MetadataSnapshot {
        MetadataSnapshot::from_text("b.aax", PROBE_TEXT)
    }

    #[test]
    fn test_lookup_first_match() {
        assert_eq!(snapshot().lookup("title"), "My Book (Unabridged)");
        assert_eq!(snapshot().lookup("genre"), "Audiobook");
    }

    #[test]
    fn test_lookup_is_raw() {
        assert_eq!(snapshot().lookup("copyright"), "©2019 Publisher/House");
    }

    #[test]
    fn test_lookup_respects_word_boundary() {
        assert_eq!(snapshot().lookup("artist"), "Jane Doe");
        assert_eq!(snapshot().lookup("album_artist"), "Narrator Name");
    }

    #[test]
    fn test_lookup_absent_key_is_empty() {
        assert_eq!(snapshot().lookup("narrator"), "");
        assert_eq!(MetadataSnapshot::from_text("x", "").lookup("title"), "");
    }

    #[test]
    fn test_lookup_empty_value_does_not_spill() {
        assert_eq!(snapshot().lookup("comment"), "");
    }

    #[test]
    fn test_lookup_mid_line() {
        assert_eq!(snapshot().lookup("bitrate"), "64 kb/s");
    }

    #[test]
    fn test_bitrate_kbps() {
        assert_eq!(snapshot().bitrate_kbps(), "64");
        let bare = MetadataSnapshot::from_text("x", "bitrate: 64 kb/s\n");
        assert_eq!(bare.bitrate_kbps(), "64");
        assert_eq!(MetadataSnapshot::from_text("x", "").bitrate_kbps(), "");
        let na = MetadataSnapshot::from_text("x", "bitrate: N/A\n");
        assert_eq!(na.bitrate_kbps(), "");
    }

    #[tokio::test]
    async fn test_extract_overwrites_capture() {
        let workspace = ScratchWorkspace::create(None).unwrap();
        let engine = MockEngine::new();
        engine.set_probe_text("/books/a.aax", "title: First\n").await;
        engine.set_probe_text("/books/b.aax", "artist: Second\n").await;

        let first = extract(&engine, Path::new("/books/a.aax"), &workspace).await.unwrap();
        assert_eq!(first.lookup("title"), "First");
        assert_eq!(first.source(), Path::new("/books/a.aax"));

        let second = extract(&engine, Path::new("/books/b.aax"), &workspace).await.unwrap();
        assert_eq!(second.lookup("title"), "");
        assert_eq!(
            std::fs::read_to_string(workspace.metadata_path()).unwrap(),
            "artist: Second\n"
        );
    }

    #[tokio::test]
    async fn test_extract_rejected_file() {
        let workspace = ScratchWorkspace::create(None).unwrap();
        let engine = MockEngine::new();
        engine.mark_invalid("/books/bad.aax").await;

        let err = extract(&engine, Path::new("/books/bad.aax"), &workspace)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ProbeFailed { .. }));
        assert!(!err.is_fatal());
    }
}
