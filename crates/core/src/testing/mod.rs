//! Testing utilities and a scriptable engine.
//!
//! [`MockEngine`] stands in for the external toolchain so the validator,
//! transcoder and batch driver can be exercised without ffmpeg installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use bookrip_core::testing::MockEngine;
//!
//! let engine = MockEngine::new();
//! engine.set_probe_text("/books/b.aax", "title: My Book\n").await;
//! engine.mark_invalid("/books/a.aax").await;
//!
//! // Drive a BatchDriver with &engine, then inspect what ran
//! let calls = engine.invocations().await;
//! ```

mod mock_engine;

pub use mock_engine::{Invocation, MockEngine};

/// Test fixtures and helper functions.
pub mod fixtures {
    /// Probe output resembling a real audiobook dump.
    pub fn probe_text(title: &str) -> String {
        format!(
            "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'book.aax':
  Metadata:
    major_brand     : aax
    title           : {title}
    artist          : Jane Doe
    album_artist    : Jane Doe
    album           : {title}
    genre           : Audiobook
    date            : 2019
    copyright       : (c)2019 Publisher
  Duration: 10:04:11.03, start: 0.000000, bitrate: 64 kb/s
  Stream #0:0(eng): Audio: aac (LC) (aavd / 0x64766161), 22050 Hz, stereo, fltp, 62 kb/s (default)
  Stream #0:1: Video: mjpeg (Baseline), yuvj420p(pc, bt470bg/unknown/unknown), 500x500, 90k tbr, 90k tbn (attached pic)
"
        )
    }
}
