use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::error;

use cmsprod_core::{CrabBatch, CrabCommand, ProcessRunner, ResubmitOptions};

use crate::cli::{CrabAction, TaskTarget};
use crate::report;

/// Splits an action into the command to run and, for `--all`, the projects
/// directory to run it over.
fn resolve(action: CrabAction) -> (CrabCommand, Option<PathBuf>) {
    fn split(target: TaskTarget) -> (PathBuf, Option<PathBuf>) {
        match target.all {
            Some(projects) => (PathBuf::new(), Some(projects)),
            None => (target.task_dir.unwrap_or_default(), None),
        }
    }

    match action {
        CrabAction::Submit { crab_config } => (CrabCommand::Submit { config: crab_config }, None),
        CrabAction::Status { target, long } => {
            let (task_dir, all) = split(target);
            (CrabCommand::Status { task_dir, long }, all)
        }
        CrabAction::Resubmit {
            target,
            max_memory,
            max_job_runtime,
            job_ids,
            site_whitelist,
        } => {
            let (task_dir, all) = split(target);
            let options = ResubmitOptions {
                max_memory_mb: max_memory,
                max_job_runtime_min: max_job_runtime,
                job_ids,
                site_whitelist,
            };
            (CrabCommand::Resubmit { task_dir, options }, all)
        }
        CrabAction::Kill { target } => {
            let (task_dir, all) = split(target);
            (CrabCommand::Kill { task_dir }, all)
        }
    }
}

pub async fn run(action: CrabAction, config_path: Option<&Path>) -> Result<i32> {
    let config = super::load_config(config_path)?;
    let batch = CrabBatch::new(Arc::new(ProcessRunner::new()), config.tools.crab.clone());
    let (command, all) = resolve(action);

    match all {
        Some(projects_dir) => {
            let batch_report = batch.run_all(&command, &projects_dir).await?;
            report::print_crab_report(command.name(), &batch_report);
            Ok(batch_report.exit_code())
        }
        None => match batch.run(&command).await {
            Ok(outcome) => Ok(outcome.code),
            Err(e) => {
                error!("{}", e);
                Ok(e.exit_code())
            }
        },
    }
}
