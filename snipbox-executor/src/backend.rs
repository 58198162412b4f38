//! Process backend abstraction trait.
//!
//! Allows swapping the local interpreter runner for a container or VM
//! runner without changing the orchestration logic.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::{ExecutorError, InterpreterCommand};

/// Captured result of one interpreter run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ProcessOutput {
    /// Everything the process wrote to stdout.
    pub stdout: Vec<u8>,
    /// Everything the process wrote to stderr.
    pub stderr: Vec<u8>,
    /// Exit code, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    /// Build an output record.
    #[must_use]
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: Option<i32>) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
        }
    }

    /// `true` when the process exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a staged script with an interpreter.
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Cancel Safety
/// Implementations must not leave a process running if the returned future
/// is dropped.
#[async_trait]
pub trait ProcessBackend: Send + Sync {
    /// Run `command` with `script` appended to its arguments, waiting at
    /// most `timeout` for it to exit.
    ///
    /// A non-zero exit is reported through [`ProcessOutput::exit_code`],
    /// not as an error.
    ///
    /// # Errors
    /// Returns [`ExecutorError::InterpreterNotFound`] if the program cannot be located.
    /// Returns [`ExecutorError::SpawnFailed`] if the process cannot be started.
    /// Returns [`ExecutorError::Timeout`] if the deadline passes first.
    async fn run(
        &self,
        command: &InterpreterCommand,
        script: &Path,
        timeout: Duration,
    ) -> Result<ProcessOutput, ExecutorError>;
}
