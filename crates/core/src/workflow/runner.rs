//! Fail-fast sequential execution of a workflow plan.

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::error::WorkflowError;
use super::types::{WorkflowPlan, WorkflowReport};
use crate::exec::CommandRunner;

/// Runs plans step by step; the first failing step ends the run.
pub struct WorkflowRunner {
    runner: Arc<dyn CommandRunner>,
}

impl WorkflowRunner {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Executes every step in order.
    ///
    /// Returns the first failure with the failing step's exit code; no later
    /// step is started after a failure.
    pub async fn execute(&self, plan: &WorkflowPlan) -> Result<WorkflowReport, WorkflowError> {
        let start = Instant::now();
        let total = plan.steps.len();

        info!(
            option = %plan.option,
            dataset = %plan.dataset,
            steps = total,
            runner = self.runner.name(),
            "Starting workflow"
        );

        for (index, step) in plan.steps.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, total, step.command_line());

            let outcome = self
                .runner
                .run(step)
                .await
                .map_err(|source| {
                    error!("[{}/{}] {} could not run: {}", index + 1, total, step.program, source);
                    WorkflowError::Exec { index, source }
                })?;

            if !outcome.success() {
                error!(
                    "[{}/{}] {} exited with code {}",
                    index + 1,
                    total,
                    step.program,
                    outcome.code
                );
                return Err(WorkflowError::StepFailed {
                    index,
                    program: step.program.clone(),
                    exit_code: outcome.code,
                });
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(option = %plan.option, duration_ms, "Workflow finished");

        Ok(WorkflowReport {
            option: plan.option,
            steps_completed: total,
            duration_ms,
        })
    }
}
