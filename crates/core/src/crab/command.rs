//! `crab` subcommands.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::exec::Invocation;

/// Tuning flags accepted by `crab resubmit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResubmitOptions {
    /// `--maxmemory` in MB.
    pub max_memory_mb: Option<u32>,
    /// `--maxjobruntime` in minutes.
    pub max_job_runtime_min: Option<u32>,
    /// `--jobids`, e.g. `1,4-7`.
    pub job_ids: Option<String>,
    /// `--sitewhitelist`, comma separated.
    pub site_whitelist: Option<String>,
}

/// A single `crab` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrabCommand {
    Submit { config: PathBuf },
    Status { task_dir: PathBuf, long: bool },
    Resubmit { task_dir: PathBuf, options: ResubmitOptions },
    Kill { task_dir: PathBuf },
}

impl CrabCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submit { .. } => "submit",
            Self::Status { .. } => "status",
            Self::Resubmit { .. } => "resubmit",
            Self::Kill { .. } => "kill",
        }
    }

    /// Same command aimed at another task directory.
    ///
    /// `Submit` is not task-scoped and is returned unchanged.
    pub fn for_task(&self, task_dir: &Path) -> Self {
        let task_dir = task_dir.to_path_buf();
        match self {
            Self::Submit { .. } => self.clone(),
            Self::Status { long, .. } => Self::Status {
                task_dir,
                long: *long,
            },
            Self::Resubmit { options, .. } => Self::Resubmit {
                task_dir,
                options: options.clone(),
            },
            Self::Kill { .. } => Self::Kill { task_dir },
        }
    }

    pub fn invocation(&self, crab: &str) -> Invocation {
        let inv = Invocation::new(crab).arg(self.name());

        match self {
            Self::Submit { config } => inv.args(["-c".to_string(), path_arg(config)]),
            Self::Status { task_dir, long } => {
                let inv = inv.args(["-d".to_string(), path_arg(task_dir)]);
                if *long {
                    inv.arg("--long")
                } else {
                    inv
                }
            }
            Self::Resubmit { task_dir, options } => {
                let mut inv = inv.args(["-d".to_string(), path_arg(task_dir)]);
                if let Some(memory) = options.max_memory_mb {
                    inv = inv.args(["--maxmemory".to_string(), memory.to_string()]);
                }
                if let Some(runtime) = options.max_job_runtime_min {
                    inv = inv.args(["--maxjobruntime".to_string(), runtime.to_string()]);
                }
                if let Some(ids) = &options.job_ids {
                    inv = inv.args(["--jobids", ids.as_str()]);
                }
                if let Some(sites) = &options.site_whitelist {
                    inv = inv.args(["--sitewhitelist", sites.as_str()]);
                }
                inv
            }
            Self::Kill { task_dir } => inv.args(["-d".to_string(), path_arg(task_dir)]),
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
