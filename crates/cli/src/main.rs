//! CLI entry point for episodic
//!
//! Parses command line arguments, runs preflight checks and hands the two
//! paths to the batch pipeline.

use clap::Parser;
use console::style;
use episodic::startup::{locate_encoder, locate_probe};
use episodic::{
    run_startup_checks, BatchError, Config, ExitPolicy, Invocation, MediaInfoProbe, ProcessRunner,
    RunContext, RunOutcome, TerminalPrompt, Toolchain,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "episodic.toml";

/// Interactive HEVC transcoder for single files and whole seasons
#[derive(Parser, Debug)]
#[command(name = "episodic")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source file, or a directory of episodes for batch mode
    input: PathBuf,

    /// Destination file, or the output directory for batch mode
    output: PathBuf,

    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Treat the encoder's nonstandard exit code as success
    #[arg(long)]
    ignore_nonstandard_exit: bool,

    /// Drop this many files from the start of the sorted batch listing
    #[arg(long, value_name = "N")]
    skip: Option<usize>,

    /// Skip the libx265 capability check. Programs are still located on PATH.
    #[arg(long, default_value = "false")]
    skip_checks: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    println!(
        "{} {}",
        style("episodic").cyan().bold(),
        style(env!("CARGO_PKG_VERSION")).dim()
    );

    match run(&args) {
        Ok(RunOutcome::Completed) => ExitCode::SUCCESS,
        Ok(RunOutcome::StoppedAfterTest) => {
            info!("Stopping after the test encode");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<RunOutcome, BatchError> {
    let config = load_config(args)?;

    let toolchain = if args.skip_checks {
        println!("WARNING: Skipping startup checks (--skip-checks enabled)");
        Toolchain {
            encoder: locate_encoder(&config.encoder.program)?,
            probe: locate_probe(&config.probe.program)?,
        }
    } else {
        run_startup_checks(&config)?
    };

    let runner = ProcessRunner::new(toolchain.encoder, ExitPolicy::from_config(&config.encoder))
        .force_color(config.encoder.force_color);
    let probe = MediaInfoProbe::new(toolchain.probe);

    let invocation = Invocation::detect(&args.input, &args.output);
    let mut prompt = TerminalPrompt::stdio();
    let mut context = RunContext::new(config, probe, runner);
    context.run(&invocation, &mut prompt)
}

fn error_line(e: &BatchError) -> String {
    format!("{} {}", style("error:").red().bold(), e)
}

/// File, then environment, then command-line flags.
///
/// The default config file may be absent; an explicitly named one may not.
fn load_config(args: &Args) -> Result<Config, BatchError> {
    let mut config = if args.config == Path::new(DEFAULT_CONFIG) {
        Config::load_or_default(&args.config)?
    } else {
        Config::load(&args.config)?
    };

    if args.ignore_nonstandard_exit {
        config.encoder.ignore_nonstandard_exit = true;
    }
    if let Some(skip) = args.skip {
        config.batch.skip_count = skip;
    }

    Ok(config)
}
