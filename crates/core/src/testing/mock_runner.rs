//! Mock command runner for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::exec::{CommandOutput, CommandRunner, ExecError, ExitOutcome, Invocation};

/// A canned response for `capture`.
#[derive(Debug, Clone)]
struct CaptureResponse {
    program: String,
    /// Only matches invocations with an argument containing this text.
    needle: Option<String>,
    output: CommandOutput,
}

/// Mock implementation of the CommandRunner trait.
///
/// Records every invocation and never starts a process:
/// - `run` exits 0 unless an exit code was set for the program
/// - `capture` returns the first matching canned response, else empty success
/// - a one-shot error can be injected for the next call
///
/// # Example
///
/// ```rust,ignore
/// use cmsprod_core::testing::MockRunner;
///
/// let runner = MockRunner::new();
/// runner.set_exit_code("cmsRun", 65).await;
/// runner.set_capture_stdout("dasgoclient", Some("dataset=/A/"), "/store/a.root\n").await;
///
/// // ... hand `Arc::new(runner.clone())` to the code under test ...
///
/// assert_eq!(runner.run_count().await, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    runs: Arc<RwLock<Vec<Invocation>>>,
    captures: Arc<RwLock<Vec<Invocation>>>,
    exit_codes: Arc<RwLock<HashMap<String, i32>>>,
    responses: Arc<RwLock<Vec<CaptureResponse>>>,
    timeouts: Arc<RwLock<HashSet<String>>>,
    next_error: Arc<RwLock<Option<ExecError>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations passed to `run`, in call order.
    pub async fn recorded_runs(&self) -> Vec<Invocation> {
        self.runs.read().await.clone()
    }

    /// Invocations passed to `capture`, in call order.
    pub async fn recorded_captures(&self) -> Vec<Invocation> {
        self.captures.read().await.clone()
    }

    pub async fn run_count(&self) -> usize {
        self.runs.read().await.len()
    }

    pub async fn capture_count(&self) -> usize {
        self.captures.read().await.len()
    }

    /// Makes every call of `program` exit with `code`.
    pub async fn set_exit_code(&self, program: &str, code: i32) {
        self.exit_codes
            .write()
            .await
            .insert(program.to_string(), code);
    }

    /// Makes the next call (run or capture) fail with this error.
    pub async fn set_next_error(&self, error: ExecError) {
        *self.next_error.write().await = Some(error);
    }

    /// Makes every capture of `program` time out.
    pub async fn set_timeout(&self, program: &str) {
        self.timeouts.write().await.insert(program.to_string());
    }

    /// Adds a canned capture response.
    pub async fn set_capture_output(
        &self,
        program: &str,
        needle: Option<&str>,
        output: CommandOutput,
    ) {
        self.responses.write().await.push(CaptureResponse {
            program: program.to_string(),
            needle: needle.map(str::to_string),
            output,
        });
    }

    /// Adds a successful canned capture response with the given stdout.
    pub async fn set_capture_stdout(&self, program: &str, needle: Option<&str>, stdout: &str) {
        self.set_capture_output(
            program,
            needle,
            CommandOutput {
                exit: ExitOutcome::new(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        )
        .await;
    }

    async fn exit_code_for(&self, program: &str) -> i32 {
        self.exit_codes
            .read()
            .await
            .get(program)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(&self, invocation: &Invocation) -> Result<ExitOutcome, ExecError> {
        self.runs.write().await.push(invocation.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(ExitOutcome::new(self.exit_code_for(&invocation.program).await))
    }

    async fn capture(
        &self,
        invocation: &Invocation,
        limit: Duration,
    ) -> Result<CommandOutput, ExecError> {
        self.captures.write().await.push(invocation.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if self.timeouts.read().await.contains(&invocation.program) {
            return Err(ExecError::Timeout {
                program: invocation.program.clone(),
                timeout_secs: limit.as_secs(),
            });
        }

        let responses = self.responses.read().await;
        let matched = responses.iter().find(|r| {
            r.program == invocation.program
                && r.needle
                    .as_ref()
                    .map(|needle| invocation.args.iter().any(|a| a.contains(needle.as_str())))
                    .unwrap_or(true)
        });

        match matched {
            Some(response) => Ok(response.output.clone()),
            None => Ok(CommandOutput {
                exit: ExitOutcome::new(self.exit_code_for(&invocation.program).await),
                stdout: String::new(),
                stderr: String::new(),
            }),
        }
    }
}
