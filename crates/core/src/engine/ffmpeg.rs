//! FFmpeg-based engine implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

use super::error::EngineError;
use super::locator::Toolchain;
use super::traits::MediaEngine;
use super::types::{ProbeOutput, TranscodeJob};
use crate::config::ActivationSecret;

/// Lines of stderr kept in an invocation error.
const STDERR_TAIL_LINES: usize = 20;

/// FFmpeg-based engine implementation.
pub struct FfmpegEngine {
    toolchain: Toolchain,
    secret: ActivationSecret,
    log_level: String,
}

impl FfmpegEngine {
    /// Creates a new engine over a resolved toolchain.
    pub fn new(toolchain: Toolchain, secret: ActivationSecret) -> Self {
        Self {
            toolchain,
            secret,
            log_level: "error".to_string(),
        }
    }

    /// Sets the ffmpeg log level for transcode passes.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Returns the resolved toolchain.
    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Leading arguments shared by every ffmpeg/ffprobe call on an input.
    fn input_args(&self, input: &Path) -> Vec<String> {
        vec![
            "-activation_bytes".to_string(),
            self.secret.expose().to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
        ]
    }

    /// Builds ffprobe arguments. The default log level keeps the metadata dump.
    fn build_probe_args(&self, input: &Path) -> Vec<String> {
        let mut args = vec!["-hide_banner".to_string()];
        args.extend(self.input_args(input));
        args
    }

    /// Builds ffmpeg arguments for a no-output full decode.
    fn build_verify_args(&self, input: &Path) -> Vec<String> {
        let mut args = vec![
            "-nostdin".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
        ];
        args.extend(self.input_args(input));
        args.extend(["-f".to_string(), "null".to_string(), "-".to_string()]);
        args
    }

    /// Builds ffmpeg arguments for the audio pass.
    fn build_transcode_args(&self, job: &TranscodeJob) -> Vec<String> {
        let mut args = vec![
            "-nostdin".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            self.log_level.clone(),
            "-y".to_string(),
        ];
        args.extend(self.input_args(&job.input_path));

        // Audio only
        args.extend([
            "-vn".to_string(),
            "-codec:a".to_string(),
            job.codec.ffmpeg_codec().to_string(),
        ]);

        if job.codec.takes_bitrate() {
            if let Some(ref bitrate) = job.bitrate {
                args.extend(["-b:a".to_string(), bitrate.clone()]);
            }
        }

        // Drop source metadata, write only ours
        args.extend(["-map_metadata".to_string(), "-1".to_string()]);
        args.extend(job.metadata.to_ffmpeg_args());

        args.push(job.output_path.to_string_lossy().to_string());
        args
    }

    /// Builds ffmpeg arguments for cover extraction.
    fn build_cover_args(&self, input: &Path, cover_path: &Path) -> Vec<String> {
        let mut args = vec![
            "-nostdin".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
        ];
        args.extend(self.input_args(input));
        args.extend([
            "-an".to_string(),
            "-codec:v".to_string(),
            "copy".to_string(),
            cover_path.to_string_lossy().to_string(),
        ]);
        args
    }

    /// Builds AtomicParsley arguments for in-place embedding.
    fn build_embed_args(cover_path: &Path, target: &Path) -> Vec<String> {
        vec![
            target.to_string_lossy().to_string(),
            "--artwork".to_string(),
            cover_path.to_string_lossy().to_string(),
            "--overWrite".to_string(),
        ]
    }

    /// Runs one tool to completion with stdin detached.
    async fn run(&self, tool: &str, program: &Path, args: &[String]) -> Result<Output, EngineError> {
        debug!(tool, program = %program.display(), "Running");

        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EngineError::ToolNotFound {
                        tool: tool.to_string(),
                        path: program.to_path_buf(),
                    }
                } else {
                    EngineError::SpawnFailed {
                        tool: tool.to_string(),
                        source: e,
                    }
                }
            })
    }

    /// Keeps the last lines of stderr for error reports.
    fn stderr_tail(output: &Output) -> Option<String> {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().collect();
        if lines.is_empty() {
            return None;
        }
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        Some(lines[start..].join("\n"))
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, input: &Path) -> Result<ProbeOutput, EngineError> {
        let args = self.build_probe_args(input);
        let output = self.run("ffprobe", &self.toolchain.ffprobe, &args).await?;

        Ok(ProbeOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            diagnostics: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn verify_decode(&self, input: &Path) -> Result<bool, EngineError> {
        let args = self.build_verify_args(input);
        let output = self.run("ffmpeg", &self.toolchain.ffmpeg, &args).await?;
        if !output.status.success() {
            debug!(stderr = ?Self::stderr_tail(&output), "Full decode failed");
        }
        Ok(output.status.success())
    }

    async fn transcode(&self, job: &TranscodeJob) -> Result<(), EngineError> {
        let args = self.build_transcode_args(job);
        let output = self.run("ffmpeg", &self.toolchain.ffmpeg, &args).await?;

        if !output.status.success() {
            return Err(EngineError::invocation_failed(
                "ffmpeg",
                format!("exited with code: {:?}", output.status.code()),
                Self::stderr_tail(&output),
            ));
        }
        Ok(())
    }

    async fn extract_cover(&self, input: &Path, cover_path: &Path) -> Result<(), EngineError> {
        let args = self.build_cover_args(input, cover_path);
        let output = self.run("ffmpeg", &self.toolchain.ffmpeg, &args).await?;

        if !output.status.success() {
            return Err(EngineError::cover_art_failed(format!(
                "extraction exited with code: {:?}",
                output.status.code()
            )));
        }
        Ok(())
    }

    async fn embed_cover(&self, cover_path: &Path, target: &Path) -> Result<(), EngineError> {
        let Some(ref embedder) = self.toolchain.atomicparsley else {
            return Err(EngineError::cover_art_failed("no cover-embedding tool available"));
        };

        let args = Self::build_embed_args(cover_path, target);
        let output = self.run("AtomicParsley", embedder, &args).await?;

        if !output.status.success() {
            return Err(EngineError::cover_art_failed(format!(
                "AtomicParsley exited with code: {:?}",
                output.status.code()
            )));
        }
        Ok(())
    }

    fn can_embed_cover(&self) -> bool {
        self.toolchain.cover_embedding()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AudioCodec, EmbeddedMetadata};
    use std::path::PathBuf;

    fn engine() -> FfmpegEngine {
        FfmpegEngine::new(
            Toolchain {
                ffmpeg: PathBuf::from("/usr/bin/ffmpeg"),
                ffprobe: PathBuf::from("/usr/bin/ffprobe"),
                atomicparsley: None,
            },
            ActivationSecret::new("deadbeef"),
        )
    }

    fn job(codec: AudioCodec) -> TranscodeJob {
        TranscodeJob {
            input_path: PathBuf::from("/books/b.aax"),
            output_path: PathBuf::from("/books/b.m4a"),
            codec,
            bitrate: Some("64k".to_string()),
            metadata: EmbeddedMetadata {
                title: "My Book".to_string(),
                ..Default::default()
            },
        }
    }

    fn position(args: &[String], flag: &str) -> usize {
        args.iter().position(|a| a == flag).unwrap()
    }

    #[test]
    fn test_identity_and_capabilities() {
        let engine = engine();
        assert_eq!(engine.name(), "ffmpeg");
        assert_eq!(engine.toolchain().ffprobe, PathBuf::from("/usr/bin/ffprobe"));
        assert!(!engine.toolchain().cover_embedding());
        assert!(!engine.can_embed_cover());
    }

    #[test]
    fn test_build_probe_args() {
        let args = engine().build_probe_args(Path::new("/books/a.aax"));
        assert_eq!(args[position(&args, "-activation_bytes") + 1], "deadbeef");
        assert_eq!(args.last().unwrap(), "/books/a.aax");
    }

    #[test]
    fn test_build_transcode_args_stream_copy() {
        let args = engine().build_transcode_args(&job(AudioCodec::Copy));

        assert!(args.contains(&"-nostdin".to_string()));
        assert!(args.contains(&"-vn".to_string()));
        assert_eq!(args[position(&args, "-codec:a") + 1], "copy");
        assert_eq!(args[position(&args, "-map_metadata") + 1], "-1");
        assert!(args.contains(&"title=My Book".to_string()));
        assert!(args.contains(&"track=1/1".to_string()));
        // Stream copy ignores bitrate
        assert!(!args.contains(&"-b:a".to_string()));
        assert_eq!(args.last().unwrap(), "/books/b.m4a");
        // Metadata replacement happens after the input is opened
        assert!(position(&args, "-i") < position(&args, "-map_metadata"));
    }

    #[test]
    fn test_build_transcode_args_reencode() {
        let args = engine().build_transcode_args(&job(AudioCodec::Mp3));
        assert_eq!(args[position(&args, "-codec:a") + 1], "libmp3lame");
        assert_eq!(args[position(&args, "-b:a") + 1], "64k");
    }

    #[test]
    fn test_build_verify_args() {
        let args = engine().build_verify_args(Path::new("/books/a.aax"));
        assert_eq!(args[position(&args, "-f") + 1], "null");
        assert_eq!(args.last().unwrap(), "-");
    }

    #[test]
    fn test_build_cover_args() {
        let args = engine().build_cover_args(Path::new("/books/a.aax"), Path::new("/tmp/w/cover.jpg"));
        assert!(args.contains(&"-an".to_string()));
        assert_eq!(args[position(&args, "-codec:v") + 1], "copy");
        assert_eq!(args.last().unwrap(), "/tmp/w/cover.jpg");
    }

    #[test]
    fn test_build_embed_args() {
        let args = FfmpegEngine::build_embed_args(Path::new("/tmp/cover.jpg"), Path::new("/out/b.m4a"));
        assert_eq!(args, vec!["/out/b.m4a", "--artwork", "/tmp/cover.jpg", "--overWrite"]);
    }

    #[tokio::test]
    async fn test_embed_without_tool() {
        let engine = engine();
        assert!(!engine.can_embed_cover());
        let err = engine
            .embed_cover(Path::new("/tmp/cover.jpg"), Path::new("/out/b.m4a"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::CoverArtFailed { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_fatal() {
        let engine = FfmpegEngine::new(
            Toolchain {
                ffmpeg: PathBuf::from("/nonexistent/ffmpeg"),
                ffprobe: PathBuf::from("/nonexistent/ffprobe"),
                atomicparsley: None,
            },
            ActivationSecret::new("deadbeef"),
        );

        let err = engine.probe(Path::new("/books/a.aax")).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
