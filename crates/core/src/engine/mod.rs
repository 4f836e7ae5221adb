//! Media engine module: the external probe/transcode toolchain.
//!
//! This module provides the `MediaEngine` trait and an ffmpeg-backed
//! implementation. Everything that touches the external executables lives
//! here; the rest of the crate only sees typed jobs and outcomes.
//!
//! # Example
//!
//! ```ignore
//! use bookrip_core::engine::{FfmpegEngine, MediaEngine, ToolLocator};
//! use bookrip_core::config::{ActivationSecret, ToolsConfig};
//!
//! let toolchain = ToolLocator::locate(&ToolsConfig::default())?;
//! let engine = FfmpegEngine::new(toolchain, ActivationSecret::new("1a2b3c4d"));
//!
//! let probe = engine.probe(Path::new("/books/book.aax")).await?;
//! println!("valid: {}", probe.success);
//! ```

mod error;
mod ffmpeg;
mod locator;
mod traits;
mod types;

pub use error::EngineError;
pub use ffmpeg::FfmpegEngine;
pub use locator::{ToolLocator, Toolchain};
pub use traits::MediaEngine;
pub use types::{AudioCodec, ContainerFormat, EmbeddedMetadata, ProbeOutput, TranscodeJob};
