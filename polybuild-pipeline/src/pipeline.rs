//! Build pipeline entrypoint used by the CLI.

use std::path::Path;

use polybuild_api::Api;
use polybuild_core::{definition, ProblemDefinition};

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::runner::StageRunner;
use crate::stages::STAGES;
use crate::state::BuildState;

/// Options for a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Run every stage's logic but send no mutating call.
    pub dry_run: bool,
}

/// Load the definition at `config_path`, then run every stage.
///
/// Configuration problems are reported before any network I/O.
pub fn build(
    config_path: &Path,
    api: &dyn Api,
    options: BuildOptions,
) -> Result<BuildState, BuildError> {
    let loaded = definition::load(config_path)?;
    tracing::debug!(path = %loaded.path.display(), "definition loaded");
    run(&loaded.definition, api, options)
}

/// Run the fixed stage sequence over an already validated definition.
///
/// Stops at the first failing stage. Stages that already ran are not undone:
/// the remote problem keeps whatever the completed stages configured.
pub fn run(
    definition: &ProblemDefinition,
    api: &dyn Api,
    options: BuildOptions,
) -> Result<BuildState, BuildError> {
    let ctx = BuildContext::new(api, options.dry_run);
    let mut state = BuildState::new();
    let mut runner = StageRunner::new();

    for stage in STAGES {
        runner.run(stage.ordinal, stage.title, &mut state, |state| {
            (stage.body)(definition, &ctx, state)
        })?;
    }

    tracing::info!(
        problem_id = ?state.problem_id,
        dry_run = options.dry_run,
        "build completed for '{}'",
        definition.polygon_name
    );
    Ok(state)
}
