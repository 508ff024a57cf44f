//! Error types for the workflow module.

use thiserror::Error;

use crate::exec::ExecError;

/// Errors that end a workflow run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The run selector was not one of the known options.
    #[error("Invalid run option. Please use 2, 3, or local.")]
    InvalidRunOption { given: String },

    /// A step exited non-zero; later steps were not started.
    #[error("Step {} ({program}) failed with exit code {exit_code}", .index + 1)]
    StepFailed {
        index: usize,
        program: String,
        exit_code: i32,
    },

    /// A step could not be started or waited on.
    #[error("Step {} could not run: {source}", .index + 1)]
    Exec {
        index: usize,
        #[source]
        source: ExecError,
    },
}

impl WorkflowError {
    /// Exit code the process should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidRunOption { .. } => 1,
            Self::StepFailed { exit_code, .. } => *exit_code,
            Self::Exec { source, .. } => source.exit_code(),
        }
    }
}
