//! Error types for the executor crate.

use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while staging or running a snippet.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutorError {
    /// Interpreter binary not found at the configured path or on `PATH`.
    #[error("interpreter not found: {program}")]
    InterpreterNotFound { program: PathBuf },

    /// The interpreter process could not be started.
    #[error("failed to start interpreter: {0}")]
    SpawnFailed(String),

    /// The process did not finish before the deadline and was killed.
    #[error("execution timed out after {}ms", .limit.as_millis())]
    Timeout { limit: Duration },

    /// Writing, relocating, or removing a staged file failed.
    #[error("staging failed at {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExecutorError {
    pub(crate) fn staging(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Staging {
            path: path.into(),
            source,
        }
    }
}
