//! `polybuild build` — run every stage against the remote service.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use polybuild_api::{ApiConfig, Client};
use polybuild_core::ProblemId;
use polybuild_pipeline::{pipeline, BuildOptions, BuildState};

/// Arguments for `polybuild build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the problem definition document.
    #[arg(long, default_value = "problem.yaml")]
    pub config: PathBuf,

    /// Run every stage but send no call that changes the remote problem.
    #[arg(long)]
    pub dry_run: bool,

    /// Per-call timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl BuildArgs {
    pub fn run(self) -> Result<()> {
        let mut config = ApiConfig::from_env()?;
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        tracing::debug!(base_url = %config.base_url, timeout = ?config.timeout, "api client configured");

        let client = Client::new(config);
        let options = BuildOptions {
            dry_run: self.dry_run,
        };
        let state = pipeline::build(&self.config, &client, options)?;
        print_summary(&state, self.dry_run);
        Ok(())
    }
}

fn print_summary(state: &BuildState, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    for stage in &state.completed {
        println!(
            "{prefix}{} STAGE {}: {}",
            "✓".green(),
            stage.ordinal,
            stage.title
        );
    }
    match state.problem_id {
        Some(ProblemId::DRY_RUN_PLACEHOLDER) if dry_run => {
            println!("{prefix}problem would be created")
        }
        Some(id) => println!("{prefix}problem id: {}", id.to_string().bold()),
        None => {}
    }
    println!("{prefix}{}", "Build completed.".green().bold());
}
