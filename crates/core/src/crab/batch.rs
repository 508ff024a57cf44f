//! Running one `crab` command over every task of a projects directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::command::CrabCommand;
use super::error::CrabError;
use crate::exec::{CommandRunner, ExecError, ExitOutcome};

/// Prefix CRAB gives task directories (`crab_<requestName>`).
const TASK_DIR_PREFIX: &str = "crab_";

/// Task directories under `projects_dir`, sorted by path.
pub async fn find_task_dirs(projects_dir: &Path) -> Result<Vec<PathBuf>, CrabError> {
    let unreadable = |source| CrabError::ProjectsDirUnreadable {
        path: projects_dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(projects_dir)
        .await
        .map_err(unreadable)?;

    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let is_task = entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with(TASK_DIR_PREFIX))
            .unwrap_or(false);
        if is_task && entry.file_type().await.map_err(unreadable)?.is_dir() {
            dirs.push(entry.path());
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// A task whose command did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task_dir: PathBuf,
    pub exit_code: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrabBatchReport {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<TaskFailure>,
}

impl CrabBatchReport {
    /// 0 when every task succeeded, else the first failure's code.
    pub fn exit_code(&self) -> i32 {
        self.failed.first().map(|f| f.exit_code).unwrap_or(0)
    }
}

/// Runs `crab` commands through a command runner.
pub struct CrabBatch {
    runner: Arc<dyn CommandRunner>,
    crab: String,
}

impl CrabBatch {
    pub fn new(runner: Arc<dyn CommandRunner>, crab: impl Into<String>) -> Self {
        Self {
            runner,
            crab: crab.into(),
        }
    }

    /// Runs one command with the caller's terminal attached.
    pub async fn run(&self, command: &CrabCommand) -> Result<ExitOutcome, ExecError> {
        let invocation = command.invocation(&self.crab);
        info!("{}", invocation.command_line());
        self.runner.run(&invocation).await
    }

    /// Runs `command` against every task directory, continuing past failures.
    pub async fn run_all(
        &self,
        command: &CrabCommand,
        projects_dir: &Path,
    ) -> Result<CrabBatchReport, CrabError> {
        let tasks = find_task_dirs(projects_dir).await?;
        if tasks.is_empty() {
            return Err(CrabError::NoTasks {
                path: projects_dir.to_path_buf(),
            });
        }

        let total = tasks.len();
        let mut report = CrabBatchReport::default();
        for (i, task_dir) in tasks.into_iter().enumerate() {
            info!("[{}/{}] {}", i + 1, total, task_dir.display());

            match self.run(&command.for_task(&task_dir)).await {
                Ok(outcome) if outcome.success() => report.succeeded.push(task_dir),
                Ok(outcome) => {
                    warn!(
                        "crab {} failed for {}: exit code {}",
                        command.name(),
                        task_dir.display(),
                        outcome.code
                    );
                    report.failed.push(TaskFailure {
                        task_dir,
                        exit_code: outcome.code,
                        reason: format!("exit code {}", outcome.code),
                    });
                }
                Err(e) => {
                    warn!(
                        "crab {} could not run for {}: {}",
                        command.name(),
                        task_dir.display(),
                        e
                    );
                    report.failed.push(TaskFailure {
                        task_dir,
                        exit_code: e.exit_code(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRunner;
    use tempfile::TempDir;

    fn projects(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("crab_not_a_dir.log"), "x").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_find_task_dirs_sorted_and_filtered() {
        let dir = projects(&["crab_b", "other", "crab_a"]);
        let tasks = find_task_dirs(dir.path()).await.unwrap();
        let names: Vec<String> = tasks
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["crab_a", "crab_b"]);
    }

    #[tokio::test]
    async fn test_find_task_dirs_missing_dir() {
        let err = find_task_dirs(Path::new("/nonexistent/crab_projects"))
            .await
            .unwrap_err();
        assert!(matches!(err, CrabError::ProjectsDirUnreadable { .. }));
    }

    #[tokio::test]
    async fn test_run_all_continues_past_failures() {
        let dir = projects(&["crab_a", "crab_b", "crab_c"]);
        let mock = MockRunner::new();
        let batch = CrabBatch::new(Arc::new(mock.clone()), "crab");

        // Every call fails; all three tasks must still be attempted.
        mock.set_exit_code("crab", 2).await;
        let command = CrabCommand::Status {
            task_dir: PathBuf::new(),
            long: false,
        };
        let report = batch.run_all(&command, dir.path()).await.unwrap();

        assert_eq!(mock.run_count().await, 3);
        assert_eq!(report.failed.len(), 3);
        assert_eq!(report.exit_code(), 2);

        let first = &mock.recorded_runs().await[0];
        assert_eq!(first.args[0], "status");
        assert!(first.args[2].ends_with("crab_a"));
    }

    #[tokio::test]
    async fn test_run_all_success() {
        let dir = projects(&["crab_a"]);
        let mock = MockRunner::new();
        let batch = CrabBatch::new(Arc::new(mock.clone()), "crab");
        let command = CrabCommand::Kill {
            task_dir: PathBuf::new(),
        };

        let report = batch.run_all(&command, dir.path()).await.unwrap();
        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_run_all_without_tasks() {
        let dir = projects(&[]);
        let batch = CrabBatch::new(Arc::new(MockRunner::new()), "crab");
        let command = CrabCommand::Kill {
            task_dir: PathBuf::new(),
        };
        let err = batch.run_all(&command, dir.path()).await.unwrap_err();
        assert!(matches!(err, CrabError::NoTasks { .. }));
    }
}
