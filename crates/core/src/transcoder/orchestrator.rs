//! Transcode orchestration for one file.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::TranscodeError;
use super::params::DerivedParameters;
use crate::config::OutputConfig;
use crate::engine::MediaEngine;
use crate::metadata;
use crate::workspace::ScratchWorkspace;

/// Runs the per-file transcode sequence.
///
/// Files are handled one at a time; the workspace and the metadata snapshot
/// are passed explicitly and reset after every file.
pub struct Transcoder<'a, E: MediaEngine + ?Sized> {
    engine: &'a E,
    workspace: &'a ScratchWorkspace,
    output: &'a OutputConfig,
}

impl<'a, E: MediaEngine + ?Sized> Transcoder<'a, E> {
    pub fn new(engine: &'a E, workspace: &'a ScratchWorkspace, output: &'a OutputConfig) -> Self {
        Self {
            engine,
            workspace,
            output,
        }
    }

    /// Transcodes one validated input and returns the artifact path.
    ///
    /// The scratch files are removed whether or not the file succeeded.
    pub async fn process(&self, input: &Path) -> Result<PathBuf, TranscodeError> {
        let result = self.run(input).await;
        let cleanup = self.workspace.reset().await;

        match (result, cleanup) {
            (Ok(output), Ok(())) => Ok(output),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    warn!("{}", cleanup_err);
                }
                Err(e)
            }
        }
    }

    async fn run(&self, input: &Path) -> Result<PathBuf, TranscodeError> {
        info!("Source: {}", input.display());

        let snapshot = metadata::extract(self.engine, input, self.workspace).await?;
        let params = DerivedParameters::derive(&snapshot, input, self.output)?;
        debug!(?params, "Derived parameters");

        let dir = params.output_dir();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| TranscodeError::OutputDirectoryFailed {
                path: dir.to_path_buf(),
                source,
            })?;

        info!(
            "Decoding {} ({}) to {}",
            params.title,
            params.codec.ffmpeg_codec(),
            params.encode_path.display()
        );
        self.engine.transcode(&params.transcode_job()).await?;
        info!("Created {}", params.encode_path.display());

        if let Some(cover) = self.extract_cover(input).await {
            self.embed_cover(&cover, &params).await;
        }

        if params.needs_rename() {
            tokio::fs::rename(&params.encode_path, &params.output_path)
                .await
                .map_err(|source| TranscodeError::RenameFailed {
                    from: params.encode_path.clone(),
                    to: params.output_path.clone(),
                    source,
                })?;
            debug!(to = %params.output_path.display(), "Relabeled container");
        }

        info!("Complete: {}", params.output_path.display());
        Ok(params.output_path)
    }

    /// Best-effort: a book without artwork is not an error.
    async fn extract_cover(&self, input: &Path) -> Option<PathBuf> {
        let cover = self.workspace.cover_path();
        match self.engine.extract_cover(input, &cover).await {
            Ok(()) if cover.exists() => {
                info!("Extracted cover art to {}", cover.display());
                Some(cover)
            }
            Ok(()) => None,
            Err(e) => {
                warn!("No cover art extracted from {}: {}", input.display(), e);
                None
            }
        }
    }

    /// Best-effort, and only for the aac family.
    async fn embed_cover(&self, cover: &Path, params: &DerivedParameters) {
        if !params.container.is_aac_family() || !self.engine.can_embed_cover() {
            return;
        }
        match self.engine.embed_cover(cover, &params.encode_path).await {
            Ok(()) => info!("Embedded cover art into {}", params.encode_path.display()),
            Err(e) => warn!(
                "Cover art not embedded into {}: {}",
                params.encode_path.display(),
                e
            ),
        }
    }
}
