use std::path::PathBuf;

use clap::Parser;

use bookrip_core::{AudioCodec, Config, ContainerFormat, FailurePolicy, NamingPolicy};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "bookrip",
    about = "Transcode DRM-wrapped audiobooks into plain audio files",
    after_help = "The activation secret is read from --authcode, BOOKRIP_ACTIVATION_BYTES, \
                  the config file, ./.authcode or ~/.authcode, in that order."
)]
pub struct Cli {
    /// Debug logging, including probe output and derived parameters
    #[arg(short, long)]
    pub debug: bool,

    /// Only validate the inputs (with a full decode); write nothing
    #[arg(short = 'V', long)]
    pub validate: bool,

    /// Activation secret for the encrypted inputs
    #[arg(short = 'A', long = "authcode", value_name = "BYTES")]
    pub authcode: Option<String>,

    /// Configuration file (defaults to ./bookrip.toml when present)
    #[arg(short, long, env = "BOOKRIP_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output container
    #[arg(short = 'e', long, value_name = "m4a|m4b|mp3|flac|opus")]
    pub container: Option<ContainerFormat>,

    /// Audio codec; defaults to the container's own
    #[arg(long, value_name = "copy|aac|mp3|flac|opus")]
    pub codec: Option<AudioCodec>,

    /// Directory for outputs; defaults to each input's directory
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output file naming
    #[arg(long, value_name = "source|title")]
    pub naming: Option<NamingPolicy>,

    /// Stop the batch at the first failed file
    #[arg(long)]
    pub strict: bool,

    /// Input files
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// Layers the command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(container) = self.container {
            config.output.container = container;
        }
        if let Some(codec) = self.codec {
            config.output.codec = Some(codec);
        }
        if let Some(dir) = &self.output_dir {
            config.output.output_dir = Some(dir.clone());
        }
        if let Some(naming) = self.naming {
            config.output.naming = naming;
        }
        if self.strict {
            config.failure_policy = FailurePolicy::Abort;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bookrip").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_short_flags() {
        let cli = parse(&["-d", "-V", "-A", "1a2b3c4d", "a.aax", "b.aax"]);
        assert!(cli.debug);
        assert!(cli.validate);
        assert_eq!(cli.authcode.as_deref(), Some("1a2b3c4d"));
        assert_eq!(cli.files, vec![PathBuf::from("a.aax"), PathBuf::from("b.aax")]);
    }

    #[test]
    fn test_end_of_options() {
        let cli = parse(&["--", "-V.aax"]);
        assert!(!cli.validate);
        assert_eq!(cli.files, vec![PathBuf::from("-V.aax")]);
    }

    #[test]
    fn test_no_files_parses() {
        let cli = parse(&["-d"]);
        assert!(cli.files.is_empty());
    }

    #[test]
    fn test_rejects_unknown_container() {
        let result = Cli::try_parse_from(["bookrip", "-e", "wav", "a.aax"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = parse(&[
            "-e", "mp3", "--codec", "mp3", "-o", "/srv/out", "--naming", "title", "--strict",
            "a.aax",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.output.container, ContainerFormat::Mp3);
        assert_eq!(config.output.codec, Some(AudioCodec::Mp3));
        assert_eq!(config.output.output_dir, Some(PathBuf::from("/srv/out")));
        assert_eq!(config.output.naming, NamingPolicy::Title);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let cli = parse(&["a.aax"]);
        let mut config = Config::default();
        config.output.container = ContainerFormat::M4b;
        cli.apply_overrides(&mut config);

        assert_eq!(config.output.container, ContainerFormat::M4b);
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
    }
}
