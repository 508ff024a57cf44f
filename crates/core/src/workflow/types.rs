//! Types for the workflow module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::WorkflowError;
use crate::exec::Invocation;

/// The named configurations the NanoAOD workflow can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOption {
    /// Run 2 (UL) NanoAOD production, selected by `"2"`.
    Run2,
    /// Run 3 NanoAOD production, selected by `"3"`.
    Run3,
    /// Local test production plus post-processing, selected by `"local"`.
    Local,
}

impl RunOption {
    pub const ALL: [RunOption; 3] = [RunOption::Run2, RunOption::Run3, RunOption::Local];

    /// The command-line spelling of this option.
    pub fn as_arg(&self) -> &'static str {
        match self {
            Self::Run2 => "2",
            Self::Run3 => "3",
            Self::Local => "local",
        }
    }
}

impl FromStr for RunOption {
    type Err = WorkflowError;

    /// Exact match only: no trimming, no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2" => Ok(Self::Run2),
            "3" => Ok(Self::Run3),
            "local" => Ok(Self::Local),
            other => Err(WorkflowError::InvalidRunOption {
                given: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RunOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// An ordered list of external calls selected by a run option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowPlan {
    pub option: RunOption,
    /// Dataset label of the profile the plan was built from.
    pub dataset: String,
    pub steps: Vec<Invocation>,
}

impl WorkflowPlan {
    /// One shell-quoted line per step.
    pub fn command_lines(&self) -> Vec<String> {
        self.steps.iter().map(Invocation::command_line).collect()
    }
}

/// Summary of a plan that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReport {
    pub option: RunOption,
    pub steps_completed: usize,
    pub duration_ms: u64,
}
