//! CRAB client command assembly.
//!
//! Grid scheduling and retry policy belong to CRAB itself. This module only
//! builds `crab` command lines and, for monitoring, walks a projects
//! directory so every task gets the same command.

mod batch;
mod command;
mod error;

pub use batch::{find_task_dirs, CrabBatch, CrabBatchReport, TaskFailure};
pub use command::{CrabCommand, ResubmitOptions};
pub use error::CrabError;
