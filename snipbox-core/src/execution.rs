use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::id::ExecutionId;
use crate::language::Language;
use crate::mode::ExecutionMode;

/// The captured outcome of running one snippet.
///
/// Results are built fresh for every request and never shared.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct ExecutionResult {
    /// Unique identifier for this execution.
    pub id: ExecutionId,
    /// Language the snippet was run as.
    pub language: Language,
    /// Mode the snippet was run in.
    pub mode: ExecutionMode,
    /// Everything the interpreter wrote to standard output.
    pub stdout: String,
    /// Everything the interpreter wrote to standard error.
    pub stderr: String,
    /// Process exit code, if the process exited on its own.
    pub exit_code: Option<i32>,
    /// Final status of the execution.
    pub status: ExecutionStatus,
    /// When execution began.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration, staging included.
    pub duration: Duration,
}

impl ExecutionResult {
    /// Create a result with empty output buffers.
    #[must_use]
    pub fn new(
        id: ExecutionId,
        language: Language,
        mode: ExecutionMode,
        status: ExecutionStatus,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            language,
            mode,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            status,
            started_at,
            duration: Duration::ZERO,
        }
    }

    /// Attach captured output, decoding lossily as UTF-8.
    #[must_use]
    pub fn with_output(mut self, stdout: &[u8], stderr: &[u8], exit_code: Option<i32>) -> Self {
        self.stdout = String::from_utf8_lossy(stdout).into_owned();
        self.stderr = String::from_utf8_lossy(stderr).into_owned();
        self.exit_code = exit_code;
        self
    }

    /// Record the elapsed wall-clock time.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// `true` when the interpreter exited cleanly.
    #[must_use]
    pub fn success(&self) -> bool {
        matches!(self.status, ExecutionStatus::Succeeded)
    }

    /// Human-readable failure description, if the execution did not succeed.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        match &self.status {
            ExecutionStatus::Succeeded => None,
            ExecutionStatus::Failed { reason } => Some(reason.clone()),
            ExecutionStatus::TimedOut { limit } => {
                Some(format!("execution timed out after {}ms", limit.as_millis()))
            }
            ExecutionStatus::StagingFailed => Some("execution failed".to_owned()),
        }
    }
}

/// The outcome of an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum ExecutionStatus {
    /// The interpreter exited with status zero.
    Succeeded,
    /// The interpreter could not be started or exited non-zero.
    Failed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The interpreter ran past the deadline and was killed.
    TimedOut {
        /// The deadline that was exceeded.
        limit: Duration,
    },
    /// The source file could not be written or relocated.
    ///
    /// Details stay in the server log; callers only learn that it failed.
    StagingFailed,
}
