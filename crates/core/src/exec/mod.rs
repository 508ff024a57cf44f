//! External program execution.
//!
//! Everything this crate does ends in a call to a pre-built tool
//! (`cmsDriver.py`, `cmsRun`, `nano_postproc.py`, `dasgoclient`, `crab`).
//! This module provides the `CommandRunner` seam those calls go through and
//! the process-backed implementation.

mod error;
mod process;
mod traits;
mod types;

pub use error::ExecError;
pub use process::ProcessRunner;
pub use traits::CommandRunner;
pub use types::{shell_quote, CommandOutput, ExitOutcome, Invocation};
