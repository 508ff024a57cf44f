//! NanoAOD production workflow.
//!
//! A run option (`2`, `3` or `local`) selects a fixed, ordered list of
//! `cmsDriver.py`, `cmsRun` and `nano_postproc.py` calls built from literal
//! parameter tables. The calls run sequentially and the first non-zero exit
//! ends the run with that exit code.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cmsprod_core::{ProcessRunner, RunOption, ToolsConfig, WorkflowConfig, WorkflowRunner};
//!
//! let option: RunOption = "3".parse()?;
//! let plan = WorkflowConfig::default().plan(option, &ToolsConfig::default());
//! let runner = WorkflowRunner::new(Arc::new(ProcessRunner::new()));
//! runner.execute(&plan).await?;
//! ```

mod config;
mod error;
mod runner;
mod types;

pub use config::{LocalProfile, NanoProfile, PostProcProfile, WorkflowConfig};
pub use error::WorkflowError;
pub use runner::WorkflowRunner;
pub use types::{RunOption, WorkflowPlan, WorkflowReport};
