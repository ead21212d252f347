//! fcbot command-line entry point.

use anyhow::Context;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

use fcbot::config::{load_config, FailurePolicy, LogLevel};
use fcbot::document::FreeCadDocument;
use fcbot::errors::FcbotError;
use fcbot::observability::{effective_level, init_logging, LogHandle};
use fcbot::pipeline::Pipeline;

#[derive(Parser, Debug)]
#[command(name = "fcbot", version, about = "FreeCAD automation tool for CI/CD workflows")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "fcbot.yaml")]
    config: PathBuf,

    /// Output directory; `fcbot.output_dir` in the configuration takes precedence
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Increase verbosity (-v for INFO, -vv for DEBUG)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Stop after the first failed step
    #[arg(long)]
    fail_fast: bool,

    /// FreeCAD project file (FCStd)
    input: PathBuf,
}

/// Exit code for an error that ended the run early.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<FcbotError>() {
        Some(FcbotError::Config(_)) => 2,
        Some(FcbotError::Document(_)) | None => 1,
    }
}

async fn run(args: Args, logging: &LogHandle) -> anyhow::Result<u8> {
    let config = load_config(&args.config).map_err(FcbotError::from)?;
    logging.set_level(effective_level(args.verbose, config.run.log_level));
    debug!(config = %args.config.display(), steps = config.steps.len(), "Configuration validated");

    let mut run_config = config.run.with_fallback_output_dir(args.output_dir);
    if args.fail_fast {
        run_config = run_config.with_failure_policy(FailurePolicy::Abort);
    }

    if config.steps.is_empty() {
        warn!("No outputs found in configuration file, exiting cleanly");
        return Ok(0);
    }

    let mut document = FreeCadDocument::open(&args.input, &run_config)
        .await
        .map_err(FcbotError::from)
        .with_context(|| format!("failed to open {}", args.input.display()))?;

    let result = Pipeline::new(run_config, config.steps)
        .run(&mut document)
        .await;

    println!("{}", result.summary().trim_end());
    Ok(result.exit_code())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let logging = init_logging(effective_level(args.verbose, LogLevel::default()));
    info!("fcbot {} started", env!("CARGO_PKG_VERSION"));

    match run(args, &logging).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}
