use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use super::secret::ActivationSecret;
use crate::engine::{AudioCodec, ContainerFormat};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Activation secret; may also come from the CLI or an authcode file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_bytes: Option<ActivationSecret>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Parent directory for the scratch workspace (system temp dir if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// What happens to the batch when one file fails after validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure and move on to the next file
    #[default]
    Isolate,
    /// Stop the batch at the first failure
    Abort,
}

/// External tool locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,
    #[serde(default = "default_atomicparsley_path")]
    pub atomicparsley_path: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            atomicparsley_path: default_atomicparsley_path(),
        }
    }
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_atomicparsley_path() -> PathBuf {
    PathBuf::from("AtomicParsley")
}

/// Output naming and encoding policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub container: ContainerFormat,
    /// Codec override; the container's default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<AudioCodec>,
    /// Output directory; each input's own directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub naming: NamingPolicy,
}

impl OutputConfig {
    /// The codec the transcode pass uses.
    pub fn codec(&self) -> AudioCodec {
        self.codec.unwrap_or_else(|| self.container.default_codec())
    }
}

/// How output files are named
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// Keep the input's base name
    #[default]
    Source,
    /// Use the sanitized book title
    Title,
}

impl FromStr for NamingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "source" => Ok(Self::Source),
            "title" => Ok(Self::Title),
            other => Err(format!("unknown naming policy '{other}' (expected source or title)")),
        }
    }
}
