//! polybuild core library — problem-definition types, document loading, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and the validated [`ProblemDefinition`]
//! - [`definition`] — YAML loader that collects every validation problem
//! - [`files`] — BOM-stripping text reads and path helpers
//! - [`error`] — [`ConfigError`], [`FileError`]

pub mod definition;
pub mod error;
pub mod files;
pub mod types;

pub use definition::{load, LoadedDefinition};
pub use error::{ConfigError, FileError};
pub use types::{
    Generator, PolygonName, ProblemDefinition, ProblemId, Sample, Solution, SolutionTag,
    Statement, Tests,
};
