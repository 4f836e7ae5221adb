//! Batch driver: validate, then transcode, one file after another.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::error;

use crate::config::{FailurePolicy, OutputConfig};
use crate::engine::{EngineError, MediaEngine};
use crate::transcoder::{TranscodeError, Transcoder};
use crate::validator::{ValidationReport, Validator};
use crate::workspace::ScratchWorkspace;

/// Errors that stop the whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The toolchain could not be run.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A file failed and the policy (or the error) does not allow going on.
    #[error("Batch aborted at {path}: {source}")]
    Aborted {
        path: PathBuf,
        #[source]
        source: TranscodeError,
    },
}

/// How the batch runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Only validate (with the full decode check); never write outputs.
    pub validate_only: bool,
    pub failure_policy: FailurePolicy,
}

/// What happened to one input.
#[derive(Debug)]
pub enum FileOutcome {
    /// Validate-only run; the report says how it went.
    Validated {
        input: PathBuf,
        report: ValidationReport,
    },
    /// Validation failed, so the file was not transcoded.
    Skipped {
        input: PathBuf,
        report: ValidationReport,
    },
    Transcoded {
        input: PathBuf,
        output: PathBuf,
    },
    /// Transcoding failed and the batch went on.
    Failed {
        input: PathBuf,
        error: TranscodeError,
    },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            Self::Validated { input, .. }
            | Self::Skipped { input, .. }
            | Self::Transcoded { input, .. }
            | Self::Failed { input, .. } => input,
        }
    }

    pub fn output(&self) -> Option<&Path> {
        match self {
            Self::Transcoded { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Dispatches every input to the validator and, when allowed, the transcoder.
pub struct BatchDriver<'a, E: MediaEngine + ?Sized> {
    engine: &'a E,
    workspace: &'a ScratchWorkspace,
    output: &'a OutputConfig,
    options: BatchOptions,
}

impl<'a, E: MediaEngine + ?Sized> BatchDriver<'a, E> {
    pub fn new(
        engine: &'a E,
        workspace: &'a ScratchWorkspace,
        output: &'a OutputConfig,
        options: BatchOptions,
    ) -> Self {
        Self {
            engine,
            workspace,
            output,
            options,
        }
    }

    /// Processes `inputs` in order.
    ///
    /// Validation failures never stop the batch. Transcode failures follow
    /// the failure policy, except a missing toolchain which always stops it.
    pub async fn run(&self, inputs: &[PathBuf]) -> Result<Vec<FileOutcome>, BatchError> {
        let validator = Validator::new(self.engine);
        let transcoder = Transcoder::new(self.engine, self.workspace, self.output);
        let mut outcomes = Vec::with_capacity(inputs.len());

        for input in inputs {
            let report = validator.validate(input, self.options.validate_only).await?;

            if self.options.validate_only {
                outcomes.push(FileOutcome::Validated {
                    input: input.clone(),
                    report,
                });
                continue;
            }

            if !report.is_processable() {
                outcomes.push(FileOutcome::Skipped {
                    input: input.clone(),
                    report,
                });
                continue;
            }

            match transcoder.process(input).await {
                Ok(output) => outcomes.push(FileOutcome::Transcoded {
                    input: input.clone(),
                    output,
                }),
                Err(e) if e.is_fatal() || self.options.failure_policy == FailurePolicy::Abort => {
                    return Err(BatchError::Aborted {
                        path: input.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    error!("Failed to transcode {}: {}", input.display(), e);
                    outcomes.push(FileOutcome::Failed {
                        input: input.clone(),
                        error: e,
                    });
                }
            }
        }

        Ok(outcomes)
    }
}
