//! # polybuild-pipeline
//!
//! Staged, fail-fast synchronization of a problem definition to the remote
//! service.
//!
//! Call [`pipeline::build`] to load a definition and run every stage, or
//! [`pipeline::run`] with an already loaded definition. Stage bodies live in
//! [`stages`] and can be exercised one at a time.

pub mod context;
pub mod error;
pub mod generators;
pub mod pipeline;
pub mod runner;
pub mod stages;
pub mod state;

pub use context::BuildContext;
pub use error::{BuildError, StageFailure};
pub use pipeline::{build, run, BuildOptions};
pub use runner::StageRunner;
pub use state::BuildState;
