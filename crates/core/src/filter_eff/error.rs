//! Error types for the filter efficiency module.

use std::path::PathBuf;
use thiserror::Error;

use crate::exec::ExecError;

/// Errors raised while computing filter efficiencies.
///
/// Variants from `NoProcessName` down are per-dataset: they are recorded as
/// failures and processing moves on to the next dataset.
#[derive(Debug, Error)]
pub enum FilterEffError {
    #[error("Unknown era: {0} (expected 2016preVFP, 2016postVFP, 2017, 2018 or all)")]
    InvalidEra(String),

    #[error("--jobs must be an integer >= 1 or 'auto', got {0}")]
    InvalidJobs(String),

    #[error("Sample list not found: {path}")]
    SampleListNotFound { path: PathBuf },

    #[error("Failed to write results to {path}: {reason}")]
    ResultsWriteFailed { path: PathBuf, reason: String },

    #[error("Could not extract process name from {dataset}")]
    NoProcessName { dataset: String },

    #[error("No files found for {process}")]
    NoFiles { process: String },

    #[error("Analyzer configuration not found at {path}")]
    AnalyzerConfigMissing { path: PathBuf },

    #[error("cmsRun failed for {process} with exit code {exit_code}")]
    CmsRunFailed {
        process: String,
        exit_code: i32,
        stderr_tail: String,
    },

    #[error("cmsRun could not run for {process}: {source}")]
    CmsRunExec {
        process: String,
        #[source]
        source: ExecError,
    },

    #[error("Could not parse filter efficiency from output for {process}")]
    ParseFailed { process: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilterEffError {
    /// Whether this error concerns one dataset rather than the whole run.
    pub fn is_dataset_failure(&self) -> bool {
        matches!(
            self,
            Self::NoProcessName { .. }
                | Self::NoFiles { .. }
                | Self::AnalyzerConfigMissing { .. }
                | Self::CmsRunFailed { .. }
                | Self::CmsRunExec { .. }
                | Self::ParseFailed { .. }
        )
    }
}
