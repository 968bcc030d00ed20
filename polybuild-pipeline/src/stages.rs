//! Stage bodies, in pipeline order.
//!
//! Every stage has the same shape: read the definition, turn fragments into
//! parameter sets, call the API through [`BuildContext`], and record any
//! remote-issued identifiers in [`BuildState`]. Each one can be invoked on
//! its own, given a state that already holds what it reads.

use std::collections::BTreeSet;
use std::iter;

use serde_json::Value;

use polybuild_api::{keys, Params};
use polybuild_core::{
    files::{file_name, read_text},
    PolygonName, ProblemDefinition, ProblemId, SolutionTag,
};

use crate::context::BuildContext;
use crate::error::StageFailure;
use crate::generators;
use crate::state::BuildState;

/// The only statement language this flow pushes.
pub const STATEMENT_LANGUAGE: &str = "english";

/// Test set that samples and generated tests go into.
pub const TESTSET: &str = "tests";

/// Signature shared by every stage body.
pub type StageFn =
    fn(&ProblemDefinition, &BuildContext<'_>, &mut BuildState) -> Result<(), StageFailure>;

/// One entry of the fixed stage sequence.
#[derive(Clone, Copy)]
pub struct Stage {
    pub ordinal: u8,
    pub title: &'static str,
    pub body: StageFn,
}

/// The fixed stage order.
pub const STAGES: [Stage; 8] = [
    Stage { ordinal: 1, title: "Problem init", body: init_problem },
    Stage { ordinal: 2, title: "Basic settings", body: push_settings },
    Stage { ordinal: 3, title: "English statement", body: push_statement },
    Stage { ordinal: 4, title: "Checker", body: push_checker },
    Stage { ordinal: 5, title: "Validator", body: push_validator },
    Stage { ordinal: 6, title: "Solutions", body: push_solutions },
    Stage { ordinal: 7, title: "Tests", body: push_tests },
    Stage { ordinal: 8, title: "Commit & package", body: commit_and_package },
];

// ---------------------------------------------------------------------------
// 1. Problem init
// ---------------------------------------------------------------------------

/// Reuse the remote problem named `polygon_name`, or create it.
///
/// A lookup error that says the problem is absent counts as "not found";
/// any other lookup error is fatal and creation is never attempted.
pub fn init_problem(
    def: &ProblemDefinition,
    ctx: &BuildContext<'_>,
    state: &mut BuildState,
) -> Result<(), StageFailure> {
    let name = &def.polygon_name;
    if let Some(id) = lookup_or_absent(ctx, name)? {
        tracing::info!(problem_id = %id, "using existing problem '{name}'");
        state.problem_id = Some(id);
        return Ok(());
    }

    tracing::info!("problem '{name}' not found; creating it");
    let id = create_problem(ctx, name)?;
    state.problem_id = Some(id);
    Ok(())
}

fn create_problem(ctx: &BuildContext<'_>, name: &PolygonName) -> Result<ProblemId, StageFailure> {
    // Re-check right before creating; never create a second problem.
    if let Some(id) = lookup_or_absent(ctx, name)? {
        return Err(StageFailure::DuplicateProblem {
            name: name.clone(),
            id,
        });
    }

    if ctx.dry_run() {
        tracing::info!(
            problem_id = %ProblemId::DRY_RUN_PLACEHOLDER,
            "[dry-run] would create problem '{name}'; using placeholder id"
        );
        return Ok(ProblemId::DRY_RUN_PLACEHOLDER);
    }

    let created = ctx.call(keys::CREATE_PROBLEM, Params::new().with("name", name))?;
    let id = id_field(&created).ok_or_else(|| StageFailure::UnexpectedResponse {
        method: "problem.create",
        detail: format!("no problem id in {created}"),
    })?;
    tracing::info!(problem_id = %id, "created problem '{name}'");
    Ok(id)
}

fn lookup_or_absent(
    ctx: &BuildContext<'_>,
    name: &PolygonName,
) -> Result<Option<ProblemId>, StageFailure> {
    match find_problem(ctx, name) {
        Ok(found) => Ok(found),
        Err(err) if is_not_found(&err) => {
            tracing::debug!(error = %err, "lookup reported absence");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Look up a problem by exact name.
pub fn find_problem(
    ctx: &BuildContext<'_>,
    name: &PolygonName,
) -> Result<Option<ProblemId>, StageFailure> {
    let listing = ctx.call(keys::LIST_PROBLEMS, Params::new().with("name", name))?;
    let problems = match &listing {
        Value::Null => return Ok(None),
        Value::Array(items) => items,
        other => {
            return Err(StageFailure::UnexpectedResponse {
                method: "problems.list",
                detail: format!("expected a list, got {other}"),
            })
        }
    };
    let Some(entry) = problems
        .iter()
        .find(|p| p.get("name").and_then(Value::as_str) == Some(name.0.as_str()))
    else {
        return Ok(None);
    };
    // A listed problem without a usable id must never read as absent.
    id_field(entry)
        .map(Some)
        .ok_or_else(|| StageFailure::UnexpectedResponse {
            method: "problems.list",
            detail: format!("problem '{name}' listed without a usable id: {entry}"),
        })
}

/// Whether a lookup failure means "no such problem".
pub fn is_not_found(err: &StageFailure) -> bool {
    let text = err.to_string().to_lowercase();
    text.contains("not found") || text.contains("does not exist")
}

fn id_field(value: &Value) -> Option<ProblemId> {
    match value.get("id")? {
        Value::Number(n) => n.as_u64().map(ProblemId),
        Value::String(s) => s.trim().parse().ok().map(ProblemId),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// 2. Basic settings
// ---------------------------------------------------------------------------

pub fn push_settings(
    def: &ProblemDefinition,
    ctx: &BuildContext<'_>,
    state: &mut BuildState,
) -> Result<(), StageFailure> {
    let pid = state.problem_id()?;
    ctx.call(
        keys::UPDATE_INFO,
        Params::new()
            .with("problemId", pid)
            .with("timeLimit", def.time_limit_ms)
            .with("memoryLimit", def.memory_mb),
    )?;

    if !def.tags.is_empty() {
        ctx.call(
            keys::SAVE_TAGS,
            Params::new()
                .with("problemId", pid)
                .with("tags", def.tags.join(",")),
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Statement
// ---------------------------------------------------------------------------

pub fn push_statement(
    def: &ProblemDefinition,
    ctx: &BuildContext<'_>,
    state: &mut BuildState,
) -> Result<(), StageFailure> {
    let pid = state.problem_id()?;
    let statement = &def.statement;
    if !statement.language.eq_ignore_ascii_case(STATEMENT_LANGUAGE) {
        return Err(StageFailure::UnsupportedLanguage(statement.language.clone()));
    }

    let mut params = Params::new()
        .with("problemId", pid)
        .with("lang", STATEMENT_LANGUAGE)
        .with("encoding", "UTF-8")
        .with("name", &def.name)
        .with("legend", read_text(&statement.legend)?)
        .with("input", read_text(&statement.input)?)
        .with("output", read_text(&statement.output)?);
    if let Some(notes) = &statement.notes {
        params.push("notes", read_text(notes)?);
    }
    if let Some(tutorial) = &statement.tutorial {
        params.push("tutorial", read_text(tutorial)?);
    }

    ctx.call(keys::SAVE_STATEMENT, params)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Checker
// ---------------------------------------------------------------------------

pub fn push_checker(
    def: &ProblemDefinition,
    ctx: &BuildContext<'_>,
    state: &mut BuildState,
) -> Result<(), StageFailure> {
    let pid = state.problem_id()?;
    ctx.call(
        keys::SET_CHECKER,
        Params::new()
            .with("problemId", pid)
            .with("checker", standard_checker(&def.checker)),
    )?;
    Ok(())
}

/// `wcmp` → `std::wcmp.cpp`; fully qualified names pass through.
pub fn standard_checker(id: &str) -> String {
    if id.starts_with("std::") {
        id.to_string()
    } else if id.ends_with(".cpp") {
        format!("std::{id}")
    } else {
        format!("std::{id}.cpp")
    }
}

// ---------------------------------------------------------------------------
// 5. Validator
// ---------------------------------------------------------------------------

pub fn push_validator(
    def: &ProblemDefinition,
    ctx: &BuildContext<'_>,
    state: &mut BuildState,
) -> Result<(), StageFailure> {
    let pid = state.problem_id()?;
    let name = file_name(&def.validator);
    upload_source(ctx, pid, &name, read_text(&def.validator)?)?;
    ctx.call(
        keys::SET_VALIDATOR,
        Params::new()
            .with("problemId", pid)
            .with("validator", &name),
    )?;
    Ok(())
}

fn upload_source(
    ctx: &BuildContext<'_>,
    pid: ProblemId,
    name: &str,
    content: String,
) -> Result<(), StageFailure> {
    ctx.call(
        keys::SAVE_FILE,
        Params::new()
            .with("problemId", pid)
            .with("type", "source")
            .with("name", name)
            .with("file", content),
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 6. Solutions
// ---------------------------------------------------------------------------

/// Upload the main solution first, then the rest in declaration order.
///
/// Exactly one solution must be tagged `main`; otherwise nothing is sent.
pub fn push_solutions(
    def: &ProblemDefinition,
    ctx: &BuildContext<'_>,
    state: &mut BuildState,
) -> Result<(), StageFailure> {
    let mains: Vec<_> = def
        .solutions
        .iter()
        .filter(|s| s.tag == SolutionTag::Main)
        .collect();
    let main = match mains.as_slice() {
        [] => return Err(StageFailure::MissingMainSolution),
        [main] => *main,
        more => return Err(StageFailure::AmbiguousMainSolution(more.len())),
    };
    let pid = state.problem_id()?;

    let others = def.solutions.iter().filter(|s| s.tag != SolutionTag::Main);
    for solution in iter::once(main).chain(others) {
        ctx.call(
            keys::SAVE_SOLUTION,
            Params::new()
                .with("problemId", pid)
                .with("name", file_name(&solution.path))
                .with("file", read_text(&solution.path)?)
                .with("sourceType", &solution.language)
                .with("tag", solution.tag.polygon_code()),
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 7. Tests
// ---------------------------------------------------------------------------

/// Save samples as tests `1..=n`, then upload generators and the script
/// that fills the slots after them.
pub fn push_tests(
    def: &ProblemDefinition,
    ctx: &BuildContext<'_>,
    state: &mut BuildState,
) -> Result<(), StageFailure> {
    let pid = state.problem_id()?;
    let samples = &def.tests.samples;
    let plan = generators::plan(&def.tests.generators, samples.len())?;

    for (index, sample) in (1u32..).zip(samples) {
        let mut params = Params::new()
            .with("problemId", pid)
            .with("testset", TESTSET)
            .with("testIndex", index)
            .with("testInput", read_text(&sample.input)?)
            .with("testUseInStatements", sample.example);
        if let Some(output) = &sample.output {
            params.push("testOutputForStatements", read_text(output)?);
        }
        ctx.call(keys::SAVE_TEST, params)?;
    }

    if plan.is_empty() {
        return Ok(());
    }

    // Sources go up before the script that references them; shared files once.
    let mut uploaded = BTreeSet::new();
    for planned in &plan {
        let name = file_name(&planned.generator.path);
        if uploaded.insert(name.clone()) {
            upload_source(ctx, pid, &name, read_text(&planned.generator.path)?)?;
        }
    }

    ctx.call(
        keys::SAVE_SCRIPT,
        Params::new()
            .with("problemId", pid)
            .with("testset", TESTSET)
            .with("source", generators::render_script(&plan)),
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 8. Commit & package
// ---------------------------------------------------------------------------

pub fn commit_and_package(
    def: &ProblemDefinition,
    ctx: &BuildContext<'_>,
    state: &mut BuildState,
) -> Result<(), StageFailure> {
    let pid = state.problem_id()?;
    ctx.call(
        keys::COMMIT_CHANGES,
        Params::new()
            .with("problemId", pid)
            .with("minorChanges", false)
            .with("message", format!("polybuild: sync {}", def.polygon_name)),
    )?;
    ctx.call(
        keys::BUILD_PACKAGE,
        Params::new()
            .with("problemId", pid)
            .with("full", false)
            .with("verify", true),
    )?;
    Ok(())
}
