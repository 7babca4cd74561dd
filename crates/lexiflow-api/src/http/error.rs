//! Application error type mapping to HTTP status codes and the error body
//! `{ "error": { "code", "message" } }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use lexiflow_core::workflow::EngineError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Engine operation errors.
    Engine(EngineError),
    /// Malformed request body or parameters.
    Validation(String),
    /// A required backend is not configured.
    Unavailable(String),
    /// Generic internal error.
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::Engine(e)
    }
}

impl AppError {
    /// Status, machine-readable code and caller-safe message.
    ///
    /// Repository and internal failures are logged here and replaced with a
    /// generic message.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Engine(e) => match e {
                EngineError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                EngineError::UnsupportedLanguage(msg) => {
                    (StatusCode::BAD_REQUEST, "UNSUPPORTED_LANGUAGE", msg.clone())
                }
                EngineError::UnknownWorkflow(name) => (
                    StatusCode::NOT_FOUND,
                    "UNKNOWN_WORKFLOW",
                    format!("Workflow '{name}' is not registered"),
                ),
                EngineError::RunNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "RUN_NOT_FOUND",
                    format!("Run {id} not found"),
                ),
                EngineError::ResumeMismatch(msg) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "RESUME_MISMATCH", msg.clone())
                }
                EngineError::RunNotResumable { status } => (
                    StatusCode::CONFLICT,
                    "RUN_NOT_RESUMABLE",
                    format!("Run is {status}; only SUSPENDED runs can be resumed"),
                ),
                EngineError::ConcurrentModification => (
                    StatusCode::CONFLICT,
                    "CONCURRENT_MODIFICATION",
                    "Run was modified by another request".to_string(),
                ),
                EngineError::Repository(inner) => {
                    tracing::error!(error = %inner, "run store failure");
                    internal()
                }
                EngineError::Internal(msg) => {
                    tracing::error!(error = %msg, "engine failure");
                    internal()
                }
            },
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                internal()
            }
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
