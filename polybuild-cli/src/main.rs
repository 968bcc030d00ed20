//! polybuild — push a problem definition to Polygon.
//!
//! # Usage
//!
//! ```text
//! polybuild build [--config problem.yaml] [--dry-run] [--timeout <SECS>] [--verbose]
//! polybuild validate [--config problem.yaml] [--json]
//! polybuild methods
//! ```
//!
//! Credentials come from `POLYGON_API_KEY` / `POLYGON_API_SECRET`.

mod commands;

use std::process::ExitCode;

use anyhow::Error;
use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{build::BuildArgs, methods::MethodsArgs, validate::ValidateArgs};
use polybuild_core::ConfigError;
use polybuild_pipeline::BuildError;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "polybuild",
    version,
    about = "Build Polygon problems from a local problem definition",
    long_about = None,
)]
struct Cli {
    /// Log every API call (same as RUST_LOG=debug).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update the remote problem, stage by stage.
    Build(BuildArgs),

    /// Check the problem definition without contacting the service.
    Validate(ValidateArgs),

    /// List the remote methods the build may call.
    Methods(MethodsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Build(args) => args.run(),
        Commands::Validate(args) => args.run(),
        Commands::Methods(args) => args.run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", render_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// One-line-per-problem report for the failure that ended the command.
fn render_error(err: &Error) -> String {
    if let Some(config) = err.downcast_ref::<ConfigError>() {
        return format!("{} {config}", "Config error:".red().bold());
    }
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::Config(config)) => format!("{} {config}", "Config error:".red().bold()),
        Some(build) => format!("{} {build}", "Build error:".red().bold()),
        None => format!("{} {err:#}", "Error:".red().bold()),
    }
}
