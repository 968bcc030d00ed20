//! Fail-fast stage runner.
//!
//! Each stage is an opaque closure over [`BuildState`]. The runner logs a
//! start marker, runs the body, and either logs a completion marker or wraps
//! the failure with the stage ordinal and title. After the first failure
//! every later `run` is refused without touching its body.

use crate::error::{BuildError, StageFailure};
use crate::state::{BuildState, CompletedStage};

#[derive(Debug, Default)]
pub struct StageRunner {
    failed: Option<u8>,
}

impl StageRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordinal of the stage that failed, if any.
    pub fn failed(&self) -> Option<u8> {
        self.failed
    }

    pub fn run<F>(
        &mut self,
        ordinal: u8,
        title: &str,
        state: &mut BuildState,
        body: F,
    ) -> Result<(), BuildError>
    where
        F: FnOnce(&mut BuildState) -> Result<(), StageFailure>,
    {
        if let Some(failed) = self.failed {
            return Err(BuildError::Aborted {
                ordinal,
                title: title.to_string(),
                failed,
            });
        }

        tracing::info!(stage = ordinal, "STAGE {ordinal}: {title}");
        match body(state) {
            Ok(()) => {
                tracing::info!(stage = ordinal, "STAGE {ordinal}: {title} DONE");
                state.completed.push(CompletedStage {
                    ordinal,
                    title: title.to_string(),
                });
                Ok(())
            }
            Err(source) => {
                tracing::error!(stage = ordinal, error = %source, "STAGE {ordinal}: {title} FAILED");
                self.failed = Some(ordinal);
                Err(BuildError::Stage {
                    ordinal,
                    title: title.to_string(),
                    source,
                })
            }
        }
    }
}
