//! High-level execution orchestrator wrapping a [`ProcessBackend`].
//!
//! Stages each request, runs it through the backend, cleans up the staged
//! file, and folds every outcome into an [`ExecutionResult`].

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::Utc;
use snipbox_core::{ExecutionId, ExecutionRequest, ExecutionResult, ExecutionStatus};

use crate::staging::Staging;
use crate::{ExecutorConfig, ExecutorError, ProcessBackend, ProcessOutput};

type ActiveSet = Arc<Mutex<BTreeSet<ExecutionId>>>;

/// High-level orchestrator for snippet execution.
///
/// Wraps a [`ProcessBackend`] and maintains a registry of in-flight
/// executions. All operations are safe to call concurrently.
pub struct ExecutionOrchestrator<B: ProcessBackend> {
    backend: B,
    config: ExecutorConfig,
    staging: Staging,
    active: ActiveSet,
}

impl<B: ProcessBackend> ExecutionOrchestrator<B> {
    /// Create a new orchestrator backed by the given process runner.
    #[must_use]
    pub fn new(backend: B, config: ExecutorConfig) -> Self {
        let staging = Staging::from_config(&config);
        Self {
            backend,
            config,
            staging,
            active: Arc::new(Mutex::new(BTreeSet::new())),
        }
    }

    /// The configuration this orchestrator runs with.
    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Create the staging directory and clear stale generated files.
    ///
    /// # Errors
    /// Propagates errors from [`Staging::prepare`].
    pub async fn prepare(&self) -> Result<usize, ExecutorError> {
        self.staging.prepare().await
    }

    /// Stage and run `request`, returning the captured result.
    ///
    /// Never fails: staging errors become [`ExecutionStatus::StagingFailed`],
    /// start failures and non-zero exits become [`ExecutionStatus::Failed`],
    /// and deadline overruns become [`ExecutionStatus::TimedOut`].
    ///
    /// # Cancel Safety
    /// Cancel safe. Dropping the future kills the interpreter and removes the
    /// execution from the active registry; the staged file may be left for
    /// the next [`prepare`](Self::prepare) to clear.
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let id = ExecutionId::new();
        let started_at = Utc::now();
        let wall_start = Instant::now();
        let _registration = ActiveExecution::register(&self.active, id);

        tracing::info!(
            execution = %id,
            language = %request.language,
            mode = %request.mode,
            "starting execution"
        );

        let (status, output) = self.run(id, request).await;
        let duration = wall_start.elapsed();

        let mut result =
            ExecutionResult::new(id, request.language, request.mode, status, started_at)
                .with_duration(duration);
        if let Some(output) = output {
            result = result.with_output(&output.stdout, &output.stderr, output.exit_code);
        }

        tracing::info!(
            execution = %id,
            success = result.success(),
            exit_code = ?result.exit_code,
            elapsed_ms = duration.as_millis(),
            "execution complete"
        );

        result
    }

    /// Return the number of executions currently in flight.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    async fn run(
        &self,
        id: ExecutionId,
        request: &ExecutionRequest,
    ) -> (ExecutionStatus, Option<ProcessOutput>) {
        let Some(command) = self.config.interpreter(request.language) else {
            let reason = format!("no interpreter configured for {}", request.language);
            tracing::error!(execution = %id, %reason, "execution refused");
            return (ExecutionStatus::Failed { reason }, None);
        };

        let staged = match self.staging.stage(request.language, &request.source()).await {
            Ok(staged) => staged,
            Err(e) => {
                tracing::error!(execution = %id, error = %e, "staging failed");
                return (ExecutionStatus::StagingFailed, None);
            }
        };

        let outcome = self.backend.run(command, staged.path(), self.config.timeout).await;

        if let Err(e) = staged.discard().await {
            tracing::warn!(execution = %id, error = %e, "failed to remove staged file");
        }

        match outcome {
            Ok(output) if output.success() => (ExecutionStatus::Succeeded, Some(output)),
            Ok(output) => {
                let reason = match output.exit_code {
                    Some(code) => format!("process exited with status {code}"),
                    None => "process terminated by signal".to_owned(),
                };
                tracing::warn!(execution = %id, %reason, "interpreter reported failure");
                (ExecutionStatus::Failed { reason }, Some(output))
            }
            Err(ExecutorError::Timeout { limit }) => {
                tracing::warn!(
                    execution = %id,
                    limit_ms = limit.as_millis(),
                    "execution timed out"
                );
                (ExecutionStatus::TimedOut { limit }, None)
            }
            Err(e) => {
                tracing::warn!(execution = %id, error = %e, "interpreter could not run");
                let reason = e.to_string();
                (ExecutionStatus::Failed { reason }, None)
            }
        }
    }
}

/// Registry entry removed on drop, so cancelled executions never linger.
struct ActiveExecution {
    active: ActiveSet,
    id: ExecutionId,
}

impl ActiveExecution {
    fn register(active: &ActiveSet, id: ExecutionId) -> Self {
        active.lock().unwrap_or_else(PoisonError::into_inner).insert(id);
        Self {
            active: Arc::clone(active),
            id,
        }
    }
}

impl Drop for ActiveExecution {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
