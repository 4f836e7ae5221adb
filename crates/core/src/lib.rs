pub mod batch;
pub mod config;
pub mod engine;
pub mod metadata;
pub mod testing;
pub mod transcoder;
pub mod validator;
pub mod workspace;

pub use batch::{BatchDriver, BatchError, BatchOptions, FileOutcome};
pub use config::{
    load_config, load_config_from_str, resolve_activation_secret, validate_config,
    ActivationSecret, Config, ConfigError, FailurePolicy, NamingPolicy, OutputConfig, ToolsConfig,
};
pub use engine::{
    AudioCodec, ContainerFormat, EngineError, FfmpegEngine, MediaEngine, ToolLocator, Toolchain,
};
pub use metadata::{sanitize, sanitize_title, MetadataSnapshot};
pub use transcoder::{DerivedParameters, TranscodeError, Transcoder};
pub use validator::{TierOutcome, ValidationReport, Validator};
pub use workspace::{ScratchWorkspace, WorkspaceError};
