use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// File name searched in the current and home directories
pub const AUTHCODE_FILE: &str = ".authcode";

/// Token that unlocks the audio stream of an encrypted container.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationSecret(String);

impl ActivationSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw token, for handing to the engine.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ActivationSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActivationSecret(<redacted>)")
    }
}

/// Pick the activation secret.
///
/// Precedence: explicit value (CLI), configuration (file or environment),
/// `.authcode` in the current directory, then in the home directory.
pub fn resolve_activation_secret(
    explicit: Option<&str>,
    config: &Config,
) -> Result<ActivationSecret, ConfigError> {
    if let Some(secret) = explicit.map(ActivationSecret::new) {
        if !secret.is_empty() {
            return Ok(secret);
        }
    }

    if let Some(secret) = config.activation_bytes.as_ref() {
        if !secret.is_empty() {
            return Ok(secret.clone());
        }
    }

    authcode_candidates()
        .iter()
        .find_map(|path| read_authcode_file(path))
        .ok_or(ConfigError::MissingActivationSecret)
}

fn authcode_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(AUTHCODE_FILE)];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(AUTHCODE_FILE));
    }
    candidates
}

/// First non-empty line of an authcode file.
fn read_authcode_file(path: &Path) -> Option<ActivationSecret> {
    let content = std::fs::read_to_string(path).ok()?;
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(ActivationSecret::new)
}
