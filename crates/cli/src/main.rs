mod cli;
mod signal;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookrip_core::{
    load_config, resolve_activation_secret, validate_config, BatchDriver, BatchError,
    BatchOptions, FfmpegEngine, FileOutcome, MediaEngine, ScratchWorkspace, ToolLocator,
};

use cli::Cli;
use signal::{Shutdown, ShutdownListener};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };
    std::process::exit(code);
}

fn init_logging(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// How the batch ended.
#[derive(Debug)]
enum BatchEnd {
    Finished(Result<Vec<FileOutcome>, BatchError>),
    Signaled(Shutdown),
}

/// Runs the batch and returns the process exit status.
///
/// Everything owning the scratch workspace is dropped before returning, so
/// the directory is gone by the time `main` exits.
async fn run(cli: Cli) -> Result<i32> {
    if cli.files.is_empty() {
        eprintln!("{}", Cli::command().render_usage());
        return Ok(1);
    }

    let mut config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    validate_config(&config).context("Configuration validation failed")?;

    let toolchain = match ToolLocator::locate(&config.tools) {
        Ok(toolchain) => toolchain,
        Err(e) => {
            error!("{}", e);
            if let Some(hint) = e.install_hint() {
                error!("{}", hint);
            }
            return Ok(1);
        }
    };

    let secret = resolve_activation_secret(cli.authcode.as_deref(), &config)?;

    let engine = FfmpegEngine::new(toolchain, secret)
        .with_log_level(if cli.debug { "info" } else { "error" });
    info!(
        "Using {} engine (cover embedding: {})",
        engine.name(),
        if engine.toolchain().cover_embedding() { "on" } else { "off" }
    );

    let mut shutdown = ShutdownListener::install().context("Failed to install signal handlers")?;
    let workspace = ScratchWorkspace::create(config.scratch_dir.as_deref())
        .context("Failed to create scratch workspace")?;

    let options = BatchOptions {
        validate_only: cli.validate,
        failure_policy: config.failure_policy,
    };

    let end = {
        let driver = BatchDriver::new(&engine, &workspace, &config.output, options);
        tokio::select! {
            result = driver.run(&cli.files) => BatchEnd::Finished(result),
            signal = shutdown.recv() => BatchEnd::Signaled(signal),
        }
    };

    if let Err(e) = workspace.close() {
        warn!("{}", e);
    }

    report(&end);
    Ok(exit_code(&end))
}

fn exit_code(end: &BatchEnd) -> i32 {
    match end {
        BatchEnd::Signaled(signal) => signal.exit_code(),
        BatchEnd::Finished(Ok(_)) => 0,
        BatchEnd::Finished(Err(_)) => 1,
    }
}

fn report(end: &BatchEnd) {
    match end {
        BatchEnd::Signaled(signal) => warn!("Stopped by {:?}", signal),
        BatchEnd::Finished(Ok(outcomes)) => {
            let failed = outcomes
                .iter()
                .filter(|o| matches!(o, FileOutcome::Failed { .. }))
                .count();
            if failed > 0 {
                warn!("{} of {} file(s) failed", failed, outcomes.len());
            }
        }
        BatchEnd::Finished(Err(e)) => {
            error!("{}", e);
            let engine_error = match e {
                BatchError::Engine(engine) => Some(engine),
                BatchError::Aborted { source, .. } => source.engine_error(),
            };
            if let Some(hint) = engine_error.and_then(|e| e.install_hint()) {
                error!("{}", hint);
            }
        }
    }
}
