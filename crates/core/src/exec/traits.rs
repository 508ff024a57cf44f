//! Trait definitions for the exec module.

use async_trait::async_trait;
use std::time::Duration;

use super::error::ExecError;
use super::types::{CommandOutput, ExitOutcome, Invocation};

/// Something that can run external programs.
///
/// The real implementation spawns processes; tests substitute a recorder.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs the invocation to completion with the caller's stdio attached.
    async fn run(&self, invocation: &Invocation) -> Result<ExitOutcome, ExecError>;

    /// Runs the invocation with captured output, killing it after `limit`.
    ///
    /// A non-zero exit is not an error here; callers inspect the returned status.
    async fn capture(
        &self,
        invocation: &Invocation,
        limit: Duration,
    ) -> Result<CommandOutput, ExecError>;
}
