//! Process-backed command runner.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::error::ExecError;
use super::traits::CommandRunner;
use super::types::{CommandOutput, ExitOutcome, Invocation};

/// Runs invocations as child processes of the current process.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).kill_on_drop(true);
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }
        command
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    fn name(&self) -> &str {
        "process"
    }

    async fn run(&self, invocation: &Invocation) -> Result<ExitOutcome, ExecError> {
        let start = Instant::now();

        let mut child = Self::command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ExecError::from_spawn(&invocation.program, e))?;

        let status = child.wait().await?;
        let outcome = ExitOutcome::from_status(status);

        debug!(
            program = %invocation.program,
            code = outcome.code,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Child finished"
        );

        Ok(outcome)
    }

    async fn capture(
        &self,
        invocation: &Invocation,
        limit: Duration,
    ) -> Result<CommandOutput, ExecError> {
        let child = Self::command(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecError::from_spawn(&invocation.program, e))?;

        // Dropping the future on timeout drops the child, and kill_on_drop reaps it.
        let output = match timeout(limit, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(ExecError::Timeout {
                    program: invocation.program.clone(),
                    timeout_secs: limit.as_secs(),
                })
            }
        };

        Ok(CommandOutput {
            exit: ExitOutcome::from_status(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
