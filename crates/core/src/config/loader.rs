use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "bookrip.toml";

/// Prefix of environment overrides, e.g. `BOOKRIP_OUTPUT__CONTAINER=m4b`
pub const ENV_PREFIX: &str = "BOOKRIP_";

/// Load configuration: defaults, then the TOML file, then environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
            figment = figment.merge(Toml::file(path));
        }
        // Optional; a missing default file contributes nothing
        None => figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE)),
    }

    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
