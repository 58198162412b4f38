//! Axum route handlers for the snipbox gateway.

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use snipbox_core::{
    ContentHash, ExecutionMode, ExecutionRequest, ExecutionResult, ExecutionStatus, Language,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::{GatewayError, ALLOWED_METHODS};
use crate::origin::request_origin;
use crate::state::AppState;

/// Largest request body accepted on `POST /`.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const INDEX_HTML: &str = include_str!("../assets/index.html");

// ── Request / response types ──────────────────────────────────────────────────

/// `POST /` body. Missing fields read as empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExecuteBody {
    /// Source code.
    pub txt: String,
    /// Language identifier.
    pub lang: String,
    /// Execution mode, `repl` or `stq`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl ExecuteBody {
    /// Trim and check every field, in the order errors are reported.
    ///
    /// # Errors
    /// Returns the first of [`GatewayError::EmptyField`],
    /// [`GatewayError::UnsupportedLanguage`], [`GatewayError::UnsupportedMode`]
    /// or [`GatewayError::CodeTooLong`] that applies.
    pub fn into_request(self, max_code_len: usize) -> Result<ExecutionRequest, GatewayError> {
        let txt = non_empty("txt", &self.txt)?;
        let lang = non_empty("lang", &self.lang)?;
        let kind = non_empty("type", &self.kind)?;

        let language: Language = lang.parse()?;
        let mode: ExecutionMode = kind.parse()?;

        if txt.chars().count() > max_code_len {
            return Err(GatewayError::CodeTooLong { max: max_code_len });
        }
        Ok(ExecutionRequest::new(txt, language, mode)?)
    }
}

fn non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, GatewayError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(GatewayError::EmptyField(field))
    } else {
        Ok(trimmed)
    }
}

/// Result returned by `POST /`.
#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    /// The submitted code, trimmed.
    pub txt: String,
    /// Captured stdout.
    pub out: String,
    /// Captured stderr.
    pub errout: String,
    /// HTTP status, repeated in the body.
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// Canonical language identifier.
    pub lang: Language,
    /// Execution mode.
    #[serde(rename = "type")]
    pub kind: ExecutionMode,
    /// `true` when the interpreter exited cleanly.
    pub success: bool,
    /// Failure description, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecuteResponse {
    fn new(request: &ExecutionRequest, result: &ExecutionResult, status: StatusCode) -> Self {
        Self {
            txt: request.code.clone(),
            out: result.stdout.clone(),
            errout: result.stderr.clone(),
            status_code: status.as_u16(),
            lang: result.language,
            kind: result.mode,
            success: result.success(),
            error: result.error(),
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router over `state`.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.cors_origin.clone());
    Router::new()
        .route(
            "/",
            get(index)
                .post(execute)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(origin: Option<HeaderValue>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);
    match origin {
        Some(origin) => layer.allow_origin(origin),
        None => layer,
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health`: liveness check with load counters.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "active_executions": state.orchestrator.active_count(),
        "tracked_origins": state.limiter.tracked_origins().await,
    }))
}

/// `GET /`: the editor page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `OPTIONS /`: empty acknowledgment listing the allowed methods.
pub async fn preflight() -> impl IntoResponse {
    let allowed = HeaderValue::from_static(ALLOWED_METHODS);
    (
        StatusCode::NO_CONTENT,
        [
            (header::ALLOW, allowed.clone()),
            (header::ACCESS_CONTROL_ALLOW_METHODS, allowed),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type")),
        ],
    )
}

async fn method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}

async fn not_found() -> GatewayError {
    GatewayError::NotFound
}

/// `POST /`: validate, rate limit, screen and run a snippet.
///
/// Shape errors are reported before the limiter is consulted, so a
/// malformed request never uses up quota.
///
/// # Errors
/// Returns a [`GatewayError`] for shape errors, rate limiting and denylist
/// hits. Execution failures are reported in the response body instead.
pub async fn execute(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, GatewayError> {
    let origin = request_origin(&request);

    let bytes = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::MalformedBody(e.to_string()))?;
    let body: ExecuteBody =
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::MalformedBody(e.to_string()))?;
    let execution = body.into_request(state.max_code_len)?;

    if !state.limiter.admit(&origin).await {
        tracing::warn!(%origin, "rate limit exceeded");
        return Err(GatewayError::RateLimited);
    }

    if let Err(violation) = state.validator.validate_language(&execution.code, execution.language)
    {
        tracing::warn!(
            %origin,
            language = %execution.language,
            rule = violation.description,
            category = %violation.category,
            digest = %ContentHash::of(execution.code.as_bytes()).short(),
            "snippet rejected by denylist"
        );
        return Err(GatewayError::ForbiddenPattern(violation.category));
    }

    let result = state.orchestrator.execute(&execution).await;
    let status = match result.status {
        ExecutionStatus::StagingFailed => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    Ok((status, Json(ExecuteResponse::new(&execution, &result, status))).into_response())
}
