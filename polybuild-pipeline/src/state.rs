//! Mutable state threaded through one build run.

use polybuild_core::ProblemId;

use crate::error::StageFailure;

/// A stage that finished successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedStage {
    pub ordinal: u8,
    pub title: String,
}

/// The only cross-stage shared state. Owned by one run, dropped at its end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildState {
    /// Set once by problem init and never changed afterwards.
    pub problem_id: Option<ProblemId>,
    pub completed: Vec<CompletedStage>,
}

impl BuildState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The remote problem id, or [`StageFailure::MissingProblemId`].
    pub fn problem_id(&self) -> Result<ProblemId, StageFailure> {
        self.problem_id.ok_or(StageFailure::MissingProblemId)
    }
}
