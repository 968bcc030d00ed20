//! Problem-definition document loader.
//!
//! # Document layout
//!
//! ```text
//! problem:    polygon_name, name, timelimit_ms, memory_mb, tags?
//! statement:  language?, legend_md, input_md, output_md, notes_md?, tutorial_md?
//! files:      checker, validator_path, solutions[{path, language, tag}]
//! tests:      samples?[{input, output?, example?}], generators?[{path, repeat, command?}]
//! ```
//!
//! The raw YAML is walked by hand so that every missing or mistyped field is
//! reported in one [`ConfigError`] instead of failing on the first one.
//! Relative paths are resolved against the directory holding the document.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::ConfigError;
use crate::files::resolve;
use crate::types::{
    Generator, PolygonName, ProblemDefinition, Sample, Solution, SolutionTag, Statement, Tests,
};

/// Statement language assumed when the document does not declare one.
pub const DEFAULT_LANGUAGE: &str = "english";

/// A definition together with where it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedDefinition {
    pub definition: ProblemDefinition,
    pub path: PathBuf,
    pub base_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// 1. Entry points
// ---------------------------------------------------------------------------

/// Read and validate the document at `path`.
pub fn load(path: &Path) -> Result<LoadedDefinition, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::single(path, format!("cannot read definition: {e}")))?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let definition = parse(&contents, &base_dir).map_err(|problems| ConfigError {
        path: path.to_path_buf(),
        problems,
    })?;
    Ok(LoadedDefinition {
        definition,
        path: path.to_path_buf(),
        base_dir,
    })
}

/// Validate raw YAML text; paths resolve against `base_dir`.
///
/// Returns every problem found, in document order.
pub fn parse(raw: &str, base_dir: &Path) -> Result<ProblemDefinition, Vec<String>> {
    let root: Value = match serde_yaml::from_str(raw) {
        Ok(Value::Null) => Value::Mapping(Default::default()),
        Ok(v) => v,
        Err(e) => return Err(vec![format!("malformed YAML: {e}")]),
    };
    if !root.is_mapping() {
        return Err(vec!["document root must be a mapping".to_string()]);
    }

    let mut walker = Walker::new(base_dir);
    let problem = walker.problem(&root);
    let statement = walker.statement(&root);
    let files = walker.files(&root);
    let tests = walker.tests(&root);

    if !walker.problems.is_empty() {
        return Err(walker.problems);
    }
    match (problem, statement, files, tests) {
        (Some(p), Some(statement), Some(f), Some(tests)) => Ok(ProblemDefinition {
            polygon_name: p.polygon_name,
            name: p.name,
            time_limit_ms: p.time_limit_ms,
            memory_mb: p.memory_mb,
            tags: p.tags,
            statement,
            checker: f.checker,
            validator: f.validator,
            solutions: f.solutions,
            tests,
        }),
        _ => Err(vec!["incomplete problem definition".to_string()]),
    }
}

// ---------------------------------------------------------------------------
// 2. Section walkers
// ---------------------------------------------------------------------------

struct ProblemSection {
    polygon_name: PolygonName,
    name: String,
    time_limit_ms: u32,
    memory_mb: u32,
    tags: Vec<String>,
}

struct FilesSection {
    checker: String,
    validator: PathBuf,
    solutions: Vec<Solution>,
}

struct Walker<'a> {
    base_dir: &'a Path,
    problems: Vec<String>,
}

impl<'a> Walker<'a> {
    fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            problems: Vec::new(),
        }
    }

    fn problem(&mut self, root: &Value) -> Option<ProblemSection> {
        let map = self.section(root, "problem")?;
        let polygon_name = self.req_str(map, "problem", "polygon_name");
        let name = self.req_str(map, "problem", "name");
        let time_limit_ms = self.req_positive(map, "problem", "timelimit_ms");
        let memory_mb = self.req_positive(map, "problem", "memory_mb");

        let mut tags: Vec<String> = Vec::new();
        for (idx, item) in self.opt_list(map, "problem", "tags").into_iter().enumerate() {
            match non_empty_str(item) {
                Some(tag) if !tags.iter().any(|t| t == tag) => tags.push(tag.to_string()),
                Some(_) => {}
                None => self.push(format!("expected non-empty string for 'problem.tags[{idx}]'")),
            }
        }

        Some(ProblemSection {
            polygon_name: PolygonName::from(polygon_name?),
            name: name?,
            time_limit_ms: time_limit_ms?,
            memory_mb: memory_mb?,
            tags,
        })
    }

    fn statement(&mut self, root: &Value) -> Option<Statement> {
        let map = self.section(root, "statement")?;
        let language = self
            .opt_str(map, "statement", "language")
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let legend = self.req_path(map, "statement", "legend_md");
        let input = self.req_path(map, "statement", "input_md");
        let output = self.req_path(map, "statement", "output_md");
        let notes = self.opt_path(map, "statement", "notes_md");
        let tutorial = self.opt_path(map, "statement", "tutorial_md");

        Some(Statement {
            language,
            legend: legend?,
            input: input?,
            output: output?,
            notes,
            tutorial,
        })
    }

    fn files(&mut self, root: &Value) -> Option<FilesSection> {
        let map = self.section(root, "files")?;
        let checker = self.req_str(map, "files", "checker");
        let validator = self.req_path(map, "files", "validator_path");

        let mut solutions = Vec::new();
        let mut main_count = 0usize;
        let mut complete = true;
        let entries = self.opt_list(map, "files", "solutions");
        for (idx, item) in entries.iter().enumerate() {
            let ctx = format!("files.solutions[{idx}]");
            if !item.is_mapping() {
                self.push(format!("expected object for '{ctx}'"));
                complete = false;
                continue;
            }
            let path = self.req_path(item, &ctx, "path");
            let language = self.req_str(item, &ctx, "language");
            let tag = self.req_str(item, &ctx, "tag").and_then(|raw| {
                match raw.parse::<SolutionTag>() {
                    Ok(tag) => Some(tag),
                    Err(e) => {
                        self.push(format!("{e} for '{ctx}.tag'"));
                        None
                    }
                }
            });
            if tag == Some(SolutionTag::Main) {
                main_count += 1;
            }
            match (path, language, tag) {
                (Some(path), Some(language), Some(tag)) => solutions.push(Solution {
                    path,
                    language,
                    tag,
                }),
                _ => complete = false,
            }
        }
        // Only judge the main tag when every entry was readable.
        if complete {
            match main_count {
                0 => self.push("no solution tagged 'main' in 'files.solutions'".to_string()),
                1 => {}
                n => self.push(format!(
                    "expected exactly one solution tagged 'main' in 'files.solutions', found {n}"
                )),
            }
        }

        Some(FilesSection {
            checker: checker?,
            validator: validator?,
            solutions,
        })
    }

    fn tests(&mut self, root: &Value) -> Option<Tests> {
        let map = self.section(root, "tests")?;
        let mut tests = Tests::default();

        for (idx, item) in self.opt_list(map, "tests", "samples").iter().enumerate() {
            let ctx = format!("tests.samples[{idx}]");
            if !item.is_mapping() {
                self.push(format!("expected object for '{ctx}'"));
                continue;
            }
            let input = self.req_path(item, &ctx, "input");
            let output = self.opt_path(item, &ctx, "output");
            let example = self.opt_bool(item, &ctx, "example").unwrap_or(false);
            if let Some(input) = input {
                tests.samples.push(Sample {
                    input,
                    output,
                    example,
                });
            }
        }

        for (idx, item) in self.opt_list(map, "tests", "generators").iter().enumerate() {
            let ctx = format!("tests.generators[{idx}]");
            if !item.is_mapping() {
                self.push(format!("expected object for '{ctx}'"));
                continue;
            }
            let path = self.req_path(item, &ctx, "path");
            let repeat = self.req_positive(item, &ctx, "repeat");
            let command = self.opt_str(item, &ctx, "command");
            if let (Some(path), Some(repeat)) = (path, repeat) {
                tests.generators.push(Generator {
                    path,
                    repeat,
                    command,
                });
            }
        }

        let total = tests.samples.len() as u64
            + tests.generators.iter().map(|g| u64::from(g.repeat)).sum::<u64>();
        if total > u64::from(u32::MAX) {
            self.push(format!(
                "'tests' declares {total} tests; test indices stop at {}",
                u32::MAX
            ));
        }

        Some(tests)
    }

    // -----------------------------------------------------------------------
    // Field helpers. Each records its own complaint and returns `None`.
    // -----------------------------------------------------------------------

    fn push(&mut self, problem: String) {
        self.problems.push(problem);
    }

    fn section<'v>(&mut self, root: &'v Value, key: &str) -> Option<&'v Value> {
        match root.get(key) {
            Some(v) if v.is_mapping() => Some(v),
            _ => {
                self.push(format!("missing or invalid '{key}' section"));
                None
            }
        }
    }

    fn req_str(&mut self, map: &Value, ctx: &str, key: &str) -> Option<String> {
        let Some(value) = map.get(key) else {
            self.push(format!("missing '{ctx}.{key}'"));
            return None;
        };
        match non_empty_str(value) {
            Some(s) => Some(s.to_string()),
            None => {
                self.push(format!("expected non-empty string for '{ctx}.{key}'"));
                None
            }
        }
    }

    fn req_path(&mut self, map: &Value, ctx: &str, key: &str) -> Option<PathBuf> {
        self.req_str(map, ctx, key)
            .map(|s| resolve(self.base_dir, &s))
    }

    fn req_positive(&mut self, map: &Value, ctx: &str, key: &str) -> Option<u32> {
        let Some(value) = map.get(key) else {
            self.push(format!("missing '{ctx}.{key}'"));
            return None;
        };
        match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) if n > 0 => Some(n),
            _ => {
                self.push(format!("expected positive integer for '{ctx}.{key}'"));
                None
            }
        }
    }

    fn opt_str(&mut self, map: &Value, ctx: &str, key: &str) -> Option<String> {
        match map.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => match non_empty_str(value) {
                Some(s) => Some(s.to_string()),
                None => {
                    self.push(format!("expected non-empty string for '{ctx}.{key}'"));
                    None
                }
            },
        }
    }

    fn opt_path(&mut self, map: &Value, ctx: &str, key: &str) -> Option<PathBuf> {
        self.opt_str(map, ctx, key)
            .map(|s| resolve(self.base_dir, &s))
    }

    fn opt_bool(&mut self, map: &Value, ctx: &str, key: &str) -> Option<bool> {
        match map.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                self.push(format!("expected boolean for '{ctx}.{key}'"));
                None
            }
        }
    }

    fn opt_list<'v>(&mut self, map: &'v Value, ctx: &str, key: &str) -> Vec<&'v Value> {
        match map.get(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items.iter().collect(),
            Some(_) => {
                self.push(format!("expected list for '{ctx}.{key}'"));
                Vec::new()
            }
        }
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
problem:
  polygon_name: two-sum
  name: Two Sum
  timelimit_ms: 2000
  memory_mb: 256
statement:
  legend_md: legend.md
  input_md: input.md
  output_md: output.md
files:
  checker: wcmp
  validator_path: validator.cpp
  solutions:
    - { path: sol.cpp, language: cpp.g++17, tag: main }
tests: {}
"#;

    #[test]
    fn minimal_document_parses_with_defaults() {
        let def = parse(MINIMAL, Path::new("/p")).expect("parse");
        assert_eq!(def.polygon_name, PolygonName::from("two-sum"));
        assert_eq!(def.statement.language, DEFAULT_LANGUAGE);
        assert_eq!(def.statement.legend, PathBuf::from("/p/legend.md"));
        assert!(def.tags.is_empty());
        assert!(def.tests.samples.is_empty());
        assert_eq!(def.main_solution().map(|s| s.path.clone()), Some(PathBuf::from("/p/sol.cpp")));
    }

    #[test]
    fn empty_document_reports_every_section() {
        let problems = parse("", Path::new(".")).unwrap_err();
        assert_eq!(problems.len(), 4, "{problems:?}");
        assert!(problems[0].contains("'problem' section"));
        assert!(problems[3].contains("'tests' section"));
    }

    #[test]
    fn duplicate_tags_are_collapsed_in_order() {
        let doc = MINIMAL.replace("memory_mb: 256", "memory_mb: 256\n  tags: [dp, math, dp]");
        let def = parse(&doc, Path::new(".")).expect("parse");
        assert_eq!(def.tags, vec!["dp".to_string(), "math".to_string()]);
    }

    #[test]
    fn zero_time_limit_is_rejected() {
        let doc = MINIMAL.replace("timelimit_ms: 2000", "timelimit_ms: 0");
        let problems = parse(&doc, Path::new(".")).unwrap_err();
        assert_eq!(problems, vec!["expected positive integer for 'problem.timelimit_ms'"]);
    }

    #[test]
    fn non_english_language_is_not_a_config_error() {
        let doc = MINIMAL.replace("statement:\n", "statement:\n  language: french\n");
        let def = parse(&doc, Path::new(".")).expect("parse");
        assert_eq!(def.statement.language, "french");
    }
}
