//! Error types for polybuild-pipeline.

use thiserror::Error;

use polybuild_api::{ApiError, MethodError};
use polybuild_core::{ConfigError, FileError, PolygonName, ProblemId};

use crate::generators::SlotOverflow;

/// Why a single stage body failed.
#[derive(Debug, Error)]
pub enum StageFailure {
    /// A remote call failed (transport or remote rejection).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An operation key is unknown or unconfirmed.
    #[error(transparent)]
    Method(#[from] MethodError),

    /// A file referenced by the definition could not be read.
    #[error(transparent)]
    File(#[from] FileError),

    #[error("statement language '{0}' is not supported; only 'english' statements can be pushed")]
    UnsupportedLanguage(String),

    #[error("no solution tagged 'main'")]
    MissingMainSolution,

    #[error("expected exactly one solution tagged 'main', found {0}")]
    AmbiguousMainSolution(usize),

    #[error(transparent)]
    Slots(#[from] SlotOverflow),

    /// The re-check before creation found the problem after all.
    #[error("problem '{name}' already exists remotely (id {id}); refusing to create a duplicate")]
    DuplicateProblem { name: PolygonName, id: ProblemId },

    #[error("no problem id in build state; problem init has not completed")]
    MissingProblemId,

    #[error("unexpected response from {method}: {detail}")]
    UnexpectedResponse { method: &'static str, detail: String },
}

/// All errors that end a build run.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The definition document is invalid. Raised before any network I/O.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A stage failed. Later stages were not run and earlier ones are not undone.
    #[error("STAGE {ordinal}: {title} FAILED: {source}")]
    Stage {
        ordinal: u8,
        title: String,
        #[source]
        source: StageFailure,
    },

    /// A stage was requested after an earlier one failed.
    #[error("STAGE {ordinal}: {title} not run; stage {failed} already failed")]
    Aborted {
        ordinal: u8,
        title: String,
        failed: u8,
    },
}
