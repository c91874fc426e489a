//! Command executor port interface

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use thiserror::Error;

/// Command execution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Refusing to run potentially destructive command: {0}")]
    DangerousCommand(String),

    #[error("Failed to execute command: {0}")]
    ExecutionFailed(String),

    #[error("Command exited with code {0}: {1}")]
    CommandFailed(i32, String),

    #[error("Command timed out")]
    Timeout,
}

/// Captured outcome of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Handle to a fire-and-forget process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachedProcess {
    pub pid: u32,
}

/// Port for running shell commands
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a command to completion with a wall-clock limit.
    ///
    /// # Arguments
    /// * `command` - Shell command line, run through `/bin/sh -c`
    /// * `timeout` - Maximum run time; the process group is killed past it
    ///
    /// # Returns
    /// The captured result on exit code 0, an error otherwise
    async fn execute(
        &self,
        command: &str,
        timeout: StdDuration,
    ) -> Result<ExecutionResult, ExecutorError>;

    /// Spawn a command without waiting for it or observing its output.
    fn execute_detached(&self, command: &str) -> Result<DetachedProcess, ExecutorError>;

    /// Timeout used when the caller has no preference
    fn default_timeout(&self) -> StdDuration;
}
