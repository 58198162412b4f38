//! Error types for the gateway crate.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use snipbox_core::CoreError;
use snipbox_guard::RuleCategory;

/// Methods served on `/`, as advertised in `Allow` headers.
pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Errors that end request handling before an execution result exists.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The body could not be read or is not the expected JSON object.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// A required field is missing or blank after trimming.
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// The `lang` field names no supported interpreter.
    #[error("unsupported language '{0}'; expected one of node, php, go")]
    UnsupportedLanguage(String),

    /// The `type` field is neither `repl` nor `stq`.
    #[error("unsupported type '{0}'; expected 'repl' or 'stq'")]
    UnsupportedMode(String),

    /// The code is longer than the configured limit.
    #[error("code exceeds the maximum length of {max} characters")]
    CodeTooLong { max: usize },

    /// The origin used up its quota for the current window.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The denylist matched. Only the broad category is exposed.
    #[error("Security validation failed: {0}")]
    ForbiddenPattern(RuleCategory),

    /// The method is not served on this path.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// No route matches the path.
    #[error("not found")]
    NotFound,
}

impl GatewayError {
    /// HTTP status this error is reported with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MalformedBody(_)
            | GatewayError::EmptyField(_)
            | GatewayError::UnsupportedLanguage(_)
            | GatewayError::UnsupportedMode(_)
            | GatewayError::CodeTooLong { .. }
            | GatewayError::ForbiddenPattern(_) => StatusCode::BAD_REQUEST,
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<CoreError> for GatewayError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnsupportedLanguage { value } => GatewayError::UnsupportedLanguage(value),
            CoreError::UnsupportedMode { value } => GatewayError::UnsupportedMode(value),
            CoreError::EmptyCode => GatewayError::EmptyField("txt"),
            other => GatewayError::MalformedBody(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({"statusCode": status.as_u16(), "message": self.to_string()}));
        let mut response = (status, body).into_response();
        if matches!(self, GatewayError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_status_codes_map_correctly() {
        assert_eq!(
            GatewayError::EmptyField("txt").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::RateLimited.into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(GatewayError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::ForbiddenPattern(RuleCategory::Network).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn method_not_allowed_advertises_allowed_methods() {
        let resp = GatewayError::MethodNotAllowed.into_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            resp.headers().get(header::ALLOW).and_then(|v| v.to_str().ok()),
            Some(ALLOWED_METHODS)
        );
    }

    #[test]
    fn forbidden_message_names_only_the_category() {
        let msg = GatewayError::ForbiddenPattern(RuleCategory::FileSystem).to_string();
        assert_eq!(msg, "Security validation failed: filesystem access");
    }

    #[test]
    fn core_errors_map_to_request_errors() {
        let err = GatewayError::from(CoreError::UnsupportedMode {
            value: "batch".to_owned(),
        });
        assert!(matches!(err, GatewayError::UnsupportedMode(ref v) if v == "batch"));
        assert!(matches!(
            GatewayError::from(CoreError::EmptyCode),
            GatewayError::EmptyField("txt")
        ));
    }
}
