//! Error types for the exec module.

use thiserror::Error;

/// Errors that can occur while starting or waiting on an external program.
#[derive(Debug, Error)]
pub enum ExecError {
    /// Program could not be found on `PATH`.
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    /// Program exists but could not be started.
    #[error("Failed to start {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Program did not finish within its time budget and was killed.
    #[error("{program} timed out after {timeout_secs} seconds")]
    Timeout { program: String, timeout_secs: u64 },

    /// I/O error while waiting on the child.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecError {
    /// Classifies a spawn error.
    pub fn from_spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        let program = program.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::ProgramNotFound { program }
        } else {
            Self::SpawnFailed { program, source }
        }
    }

    /// Shell-style exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ProgramNotFound { .. } => 127,
            Self::SpawnFailed { .. } => 126,
            Self::Timeout { .. } => 124,
            Self::Io(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_from_spawn_not_found() {
        let err = ExecError::from_spawn("cmsRun", Error::new(ErrorKind::NotFound, "nope"));
        assert!(matches!(err, ExecError::ProgramNotFound { .. }));
        assert_eq!(err.exit_code(), 127);
    }

    #[test]
    fn test_from_spawn_permission_denied() {
        let err = ExecError::from_spawn("cmsRun", Error::new(ErrorKind::PermissionDenied, "no"));
        assert!(matches!(err, ExecError::SpawnFailed { .. }));
        assert_eq!(err.exit_code(), 126);
    }
}
