//! Shared application state.

use std::sync::Arc;

use axum::http::HeaderValue;
use snipbox_executor::{ExecutionOrchestrator, LocalProcessBackend};
use snipbox_guard::{GuardError, PatternValidator, RateLimiter};

use crate::config::GatewayConfig;

/// Handles shared by every request handler.
///
/// Cheap to clone; all components live behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Content denylist, immutable after construction.
    pub validator: Arc<PatternValidator>,
    /// Per-origin sliding-window limiter.
    pub limiter: Arc<RateLimiter>,
    /// Stages and runs snippets.
    pub orchestrator: Arc<ExecutionOrchestrator<LocalProcessBackend>>,
    /// Maximum code length in characters.
    pub max_code_len: usize,
    /// Origin granted cross-origin access, if any.
    pub cors_origin: Option<HeaderValue>,
}

impl AppState {
    /// Build every component from `config`.
    ///
    /// Does not touch the filesystem; call
    /// [`ExecutionOrchestrator::prepare`] before serving.
    ///
    /// # Errors
    /// Returns [`GuardError`] if a denylist rule fails to compile.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GuardError> {
        Ok(Self {
            validator: Arc::new(PatternValidator::new()?),
            limiter: Arc::new(RateLimiter::new(config.limiter)),
            orchestrator: Arc::new(ExecutionOrchestrator::new(
                LocalProcessBackend::new(),
                config.executor.clone(),
            )),
            max_code_len: config.max_code_len,
            cors_origin: config.cors_origin.clone(),
        })
    }
}
