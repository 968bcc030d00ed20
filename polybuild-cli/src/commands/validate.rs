//! `polybuild validate` — load the definition and report every problem.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use polybuild_core::{definition, files::file_name, LoadedDefinition, ProblemDefinition};
use polybuild_pipeline::generators;

/// Arguments for `polybuild validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the problem definition document.
    #[arg(long, default_value = "problem.yaml")]
    pub config: PathBuf,

    /// Emit the parsed definition as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ValidateArgs {
    pub fn run(self) -> Result<()> {
        let loaded = definition::load(&self.config)?;
        if self.json {
            return print_json(&loaded);
        }
        print_report(&loaded)
    }
}

#[derive(Serialize)]
struct ValidateJson<'a> {
    path: String,
    definition: &'a ProblemDefinition,
    tests: Vec<TestRow>,
}

#[derive(Tabled, Serialize)]
struct TestRow {
    #[tabled(rename = "tests")]
    tests: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "kind")]
    kind: String,
}

fn print_json(loaded: &LoadedDefinition) -> Result<()> {
    let payload = ValidateJson {
        path: loaded.path.display().to_string(),
        definition: &loaded.definition,
        tests: test_rows(&loaded.definition)?,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize definition JSON")?
    );
    Ok(())
}

fn print_report(loaded: &LoadedDefinition) -> Result<()> {
    let def = &loaded.definition;
    println!(
        "{} {} is valid",
        "✓".green(),
        loaded.path.display().to_string().bold()
    );
    println!(
        "  {} ({}) | {} ms | {} MB | {} solution{}",
        def.polygon_name,
        def.name,
        def.time_limit_ms,
        def.memory_mb,
        def.solutions.len(),
        if def.solutions.len() == 1 { "" } else { "s" }
    );
    if !def.tags.is_empty() {
        println!("  tags: {}", def.tags.join(", "));
    }

    let rows = test_rows(def)?;
    if rows.is_empty() {
        println!("  {}", "no tests declared".yellow());
        return Ok(());
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

/// Samples first, then one row per generator block.
fn test_rows(def: &ProblemDefinition) -> Result<Vec<TestRow>> {
    let samples = &def.tests.samples;
    let plan = generators::plan(&def.tests.generators, samples.len())
        .context("cannot number the declared tests")?;

    let mut rows: Vec<TestRow> = (1u32..)
        .zip(samples)
        .map(|(index, sample)| TestRow {
            tests: index.to_string(),
            source: file_name(&sample.input),
            kind: if sample.example { "example" } else { "manual" }.to_string(),
        })
        .collect();
    rows.extend(plan.into_iter().map(|planned| TestRow {
        tests: format!("{}-{}", planned.slots.first, planned.slots.last),
        source: file_name(&planned.generator.path),
        kind: match &planned.generator.command {
            Some(_) => "generated (command)".to_string(),
            None => "generated".to_string(),
        },
    }));
    Ok(rows)
}
