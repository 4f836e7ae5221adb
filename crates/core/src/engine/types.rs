//! Types for the engine module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Output container format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    /// MPEG-4 audio (.m4a)
    #[default]
    M4a,
    /// MPEG-4 audiobook (.m4b), the same bitstream as m4a under another name
    M4b,
    /// MPEG Audio Layer III
    Mp3,
    /// Free Lossless Audio Codec
    Flac,
    /// Opus in an Ogg container
    Opus,
}

impl ContainerFormat {
    /// Returns the file extension of the finished artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::M4a => "m4a",
            Self::M4b => "m4b",
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
            Self::Opus => "opus",
        }
    }

    /// Returns the extension the engine writes.
    ///
    /// The m4b sibling is produced by renaming an m4a output.
    pub fn encode_extension(&self) -> &'static str {
        match self {
            Self::M4a | Self::M4b => "m4a",
            other => other.extension(),
        }
    }

    /// Whether this is one of the aac-family MPEG-4 containers.
    pub fn is_aac_family(&self) -> bool {
        matches!(self, Self::M4a | Self::M4b)
    }

    /// Codec used when none is configured.
    pub fn default_codec(&self) -> AudioCodec {
        match self {
            Self::M4a | Self::M4b => AudioCodec::Copy,
            Self::Mp3 => AudioCodec::Mp3,
            Self::Flac => AudioCodec::Flac,
            Self::Opus => AudioCodec::Opus,
        }
    }

    /// Whether the container can carry the given codec.
    pub fn accepts(&self, codec: AudioCodec) -> bool {
        match self {
            Self::M4a | Self::M4b => matches!(codec, AudioCodec::Copy | AudioCodec::Aac),
            Self::Mp3 => codec == AudioCodec::Mp3,
            Self::Flac => codec == AudioCodec::Flac,
            Self::Opus => codec == AudioCodec::Opus,
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ContainerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "m4a" => Ok(Self::M4a),
            "m4b" => Ok(Self::M4b),
            "mp3" => Ok(Self::Mp3),
            "flac" => Ok(Self::Flac),
            "opus" => Ok(Self::Opus),
            other => Err(format!(
                "unknown container '{other}' (expected m4a, m4b, mp3, flac or opus)"
            )),
        }
    }
}

/// Audio codec policy for the transcode pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCodec {
    /// Stream copy (no re-encoding)
    Copy,
    /// Advanced Audio Coding
    Aac,
    /// MPEG Audio Layer III
    Mp3,
    /// Free Lossless Audio Codec
    Flac,
    /// Opus
    Opus,
}

impl AudioCodec {
    /// Returns the ffmpeg codec name for this policy.
    pub fn ffmpeg_codec(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Aac => "aac",
            Self::Mp3 => "libmp3lame",
            Self::Flac => "flac",
            Self::Opus => "libopus",
        }
    }

    /// Whether a target bitrate applies to this codec.
    pub fn takes_bitrate(&self) -> bool {
        matches!(self, Self::Aac | Self::Mp3 | Self::Opus)
    }
}

impl FromStr for AudioCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "copy" => Ok(Self::Copy),
            "aac" => Ok(Self::Aac),
            "mp3" => Ok(Self::Mp3),
            "flac" => Ok(Self::Flac),
            "opus" => Ok(Self::Opus),
            other => Err(format!(
                "unknown codec '{other}' (expected copy, aac, mp3, flac or opus)"
            )),
        }
    }
}

/// Metadata written into the output container.
///
/// Replaces everything the source carried; every field is expected to have
/// been sanitized already.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedMetadata {
    pub title: String,
    pub artist: String,
    pub album_artist: String,
    pub album: String,
    pub date: String,
    pub genre: String,
    pub copyright: String,
}

impl EmbeddedMetadata {
    /// Convert to ffmpeg metadata arguments.
    ///
    /// The track number is always `1/1`: one book, one file.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let fields = [
            ("title", self.title.as_str()),
            ("artist", self.artist.as_str()),
            ("album_artist", self.album_artist.as_str()),
            ("album", self.album.as_str()),
            ("date", self.date.as_str()),
            ("track", "1/1"),
            ("genre", self.genre.as_str()),
            ("copyright", self.copyright.as_str()),
        ];

        fields
            .iter()
            .flat_map(|(key, value)| ["-metadata".to_string(), format!("{}={}", key, value)])
            .collect()
    }
}

/// A transcode request for one input file.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeJob {
    /// Input file path.
    pub input_path: PathBuf,
    /// Path the engine writes.
    pub output_path: PathBuf,
    /// Audio codec policy.
    pub codec: AudioCodec,
    /// Target bitrate with unit suffix (e.g. "64k").
    pub bitrate: Option<String>,
    /// Replacement container metadata.
    pub metadata: EmbeddedMetadata,
}

/// Captured result of one probe invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutput {
    /// Whether the probe exited successfully.
    pub success: bool,
    /// Exit code, when the process was not killed by a signal.
    pub exit_code: Option<i32>,
    /// The diagnostic text stream (stderr).
    pub diagnostics: String,
}
