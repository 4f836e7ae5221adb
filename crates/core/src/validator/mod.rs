//! Tiered input validation.
//!
//! Checks escalate in cost: the file must exist and be readable, then the
//! probe must accept it with the activation secret, then (only for thorough
//! runs) a full decode must succeed. Outcomes are reported through logging and
//! returned as a [`ValidationReport`]; a failed tier is never an `Err`.

use std::path::Path;
use tracing::{error, info};

use crate::engine::{EngineError, MediaEngine};

/// Outcome of one validation tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOutcome {
    Pass,
    Fail,
    Skipped,
}

impl TierOutcome {
    fn from_success(success: bool) -> Self {
        if success {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

/// Per-tier results for one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationReport {
    /// Tier 1: exists and is readable.
    pub existence: TierOutcome,
    /// Tier 2: the probe accepts it.
    pub structure: TierOutcome,
    /// Tier 3: it decodes end to end.
    pub decode: TierOutcome,
}

impl ValidationReport {
    fn missing() -> Self {
        Self {
            existence: TierOutcome::Fail,
            structure: TierOutcome::Skipped,
            decode: TierOutcome::Skipped,
        }
    }

    /// Whether the transcoder may run on this file.
    pub fn is_processable(&self) -> bool {
        self.existence == TierOutcome::Pass
            && self.structure == TierOutcome::Pass
            && self.decode != TierOutcome::Fail
    }

    /// The first tier that failed, numbered from 1.
    pub fn failed_tier(&self) -> Option<u8> {
        [self.existence, self.structure, self.decode]
            .iter()
            .position(|t| *t == TierOutcome::Fail)
            .map(|i| i as u8 + 1)
    }
}

/// Runs the validation tiers against one file at a time.
pub struct Validator<'a, E: MediaEngine + ?Sized> {
    engine: &'a E,
}

impl<'a, E: MediaEngine + ?Sized> Validator<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Validates `input`. With `full_check`, also runs the full decode and
    /// logs a confirmation for every tier that passes.
    ///
    /// Only an engine that cannot be run at all produces an `Err`.
    pub async fn validate(
        &self,
        input: &Path,
        full_check: bool,
    ) -> Result<ValidationReport, EngineError> {
        if !is_readable_file(input).await {
            error!("File NOT found or not readable: {}", input.display());
            return Ok(ValidationReport::missing());
        }

        let probe = self.engine.probe(input).await?;
        if !probe.success {
            report_invalid(input);
            return Ok(ValidationReport {
                existence: TierOutcome::Pass,
                structure: TierOutcome::Fail,
                decode: TierOutcome::Skipped,
            });
        }
        if full_check {
            info!("Valid container: {}", input.display());
        }

        let decode = if full_check {
            let decoded = self.engine.verify_decode(input).await?;
            if decoded {
                info!("Full decode OK: {}", input.display());
            } else {
                report_invalid(input);
            }
            TierOutcome::from_success(decoded)
        } else {
            TierOutcome::Skipped
        };

        Ok(ValidationReport {
            existence: TierOutcome::Pass,
            structure: TierOutcome::Pass,
            decode,
        })
    }
}

/// Tiers 2 and 3 share one message.
fn report_invalid(input: &Path) {
    error!("Invalid or corrupt file: {}", input.display());
}

async fn is_readable_file(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => tokio::fs::File::open(path).await.is_ok(),
        _ => false,
    }
}
