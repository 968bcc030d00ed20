//! Domain types for a problem definition.
//!
//! All path fields use `PathBuf`, already resolved against the directory of
//! the definition document. A [`ProblemDefinition`] is immutable after load.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The unique short name of a problem on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PolygonName(pub String);

impl fmt::Display for PolygonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PolygonName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PolygonName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Remote-issued problem identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ProblemId(pub u64);

impl ProblemId {
    /// Stand-in id used when a dry run skips problem creation.
    pub const DRY_RUN_PLACEHOLDER: ProblemId = ProblemId(0);
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for ProblemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Verdict tag attached to a solution file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolutionTag {
    Main,
    Correct,
    WrongAnswer,
    TimeLimit,
    TimeLimitOrCorrect,
    MemoryLimit,
    PresentationError,
    Rejected,
    Failed,
}

impl SolutionTag {
    /// Two-letter tag the remote service expects in `problem.saveSolution`.
    pub fn polygon_code(self) -> &'static str {
        match self {
            SolutionTag::Main => "MA",
            SolutionTag::Correct => "OK",
            SolutionTag::WrongAnswer => "WA",
            SolutionTag::TimeLimit => "TL",
            SolutionTag::TimeLimitOrCorrect => "TO",
            SolutionTag::MemoryLimit => "ML",
            SolutionTag::PresentationError => "PE",
            SolutionTag::Rejected => "RJ",
            SolutionTag::Failed => "FL",
        }
    }
}

impl fmt::Display for SolutionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolutionTag::Main => "main",
            SolutionTag::Correct => "correct",
            SolutionTag::WrongAnswer => "wrong-answer",
            SolutionTag::TimeLimit => "time-limit",
            SolutionTag::TimeLimitOrCorrect => "time-limit-or-correct",
            SolutionTag::MemoryLimit => "memory-limit",
            SolutionTag::PresentationError => "presentation-error",
            SolutionTag::Rejected => "rejected",
            SolutionTag::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl FromStr for SolutionTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(SolutionTag::Main),
            "correct" => Ok(SolutionTag::Correct),
            "wrong-answer" => Ok(SolutionTag::WrongAnswer),
            "time-limit" => Ok(SolutionTag::TimeLimit),
            "time-limit-or-correct" => Ok(SolutionTag::TimeLimitOrCorrect),
            "memory-limit" => Ok(SolutionTag::MemoryLimit),
            "presentation-error" => Ok(SolutionTag::PresentationError),
            "rejected" => Ok(SolutionTag::Rejected),
            "failed" => Ok(SolutionTag::Failed),
            other => Err(format!("unknown solution tag '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Statement text blocks, each a file reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub language: String,
    pub legend: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tutorial: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Solution {
    pub path: PathBuf,
    pub language: String,
    pub tag: SolutionTag,
}

/// A hand-written test. `example` marks it as shown in the statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub input: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub example: bool,
}

/// A generator program producing `repeat` tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generator {
    pub path: PathBuf,
    pub repeat: u32,
    /// Script line emitted verbatim instead of the templated range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Tests {
    pub samples: Vec<Sample>,
    pub generators: Vec<Generator>,
}

/// A fully validated problem definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemDefinition {
    pub polygon_name: PolygonName,
    pub name: String,
    pub time_limit_ms: u32,
    pub memory_mb: u32,
    pub tags: Vec<String>,
    pub statement: Statement,
    pub checker: String,
    pub validator: PathBuf,
    pub solutions: Vec<Solution>,
    pub tests: Tests,
}

impl ProblemDefinition {
    /// The solution tagged `main`, if any.
    pub fn main_solution(&self) -> Option<&Solution> {
        self.solutions.iter().find(|s| s.tag == SolutionTag::Main)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
