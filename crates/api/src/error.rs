use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use panomax_forge::AuthError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent `{error, code}`
/// JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Token acquisition against the auth provider failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Auth(err) => {
                tracing::error!(error = %err, "Upstream authentication failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_AUTH",
                    "Could not authenticate against the auth provider".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
