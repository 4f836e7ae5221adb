//! Per-file transcode orchestration.
//!
//! For one validated input: probe, derive sanitized parameters, run the audio
//! pass, pull the cover image out, embed it, relabel the container and clean
//! the scratch workspace.

mod error;
mod orchestrator;
mod params;

pub use error::TranscodeError;
pub use orchestrator::Transcoder;
pub use params::DerivedParameters;
