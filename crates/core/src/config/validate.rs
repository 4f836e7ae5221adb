use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Tool paths are not empty
/// - The codec fits the container
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let tools = [
        ("tools.ffmpeg_path", &config.tools.ffmpeg_path),
        ("tools.ffprobe_path", &config.tools.ffprobe_path),
        ("tools.atomicparsley_path", &config.tools.atomicparsley_path),
    ];
    for (key, path) in tools {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!("{} cannot be empty", key)));
        }
    }

    let container = config.output.container;
    let codec = config.output.codec();
    if !container.accepts(codec) {
        return Err(ConfigError::ValidationError(format!(
            "codec {:?} cannot be written to a {} container",
            codec, container
        )));
    }

    Ok(())
}
