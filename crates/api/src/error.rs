use atelier_core::error::CoreError;
use atelier_provider::ProviderError;
use atelier_storage::StorageError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain, provider and storage errors and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `atelier_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The generation provider rejected a request or could not be reached.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The artifact store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::AllGenerationsFailed { .. } => {
                    (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", core.to_string())
                }
                CoreError::GenerationTimedOut { .. } => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "GENERATION_TIMEOUT",
                    core.to_string(),
                ),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Provider errors ---
            AppError::Provider(err) => classify_provider_error(err),

            // --- Storage errors ---
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Artifact storage is unavailable".to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a provider error into an HTTP status, error code, and message.
///
/// - A provider 404 maps to 404.
/// - Any other provider status maps to 502 and keeps the provider's body,
///   which usually explains a rejected input.
/// - Undecodable bodies and transport failures map to 502 with a
///   sanitized message.
fn classify_provider_error(err: &ProviderError) -> (StatusCode, &'static str, String) {
    match err {
        ProviderError::ApiError { status: 404, .. } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found at provider".to_string(),
        ),
        ProviderError::ApiError { status, body } => {
            tracing::warn!(status, body = %body, "Provider rejected request");
            (
                StatusCode::BAD_GATEWAY,
                "PROVIDER_ERROR",
                format!("Provider returned HTTP {status}: {body}"),
            )
        }
        ProviderError::EmptySubmission => (
            StatusCode::BAD_GATEWAY,
            "PROVIDER_ERROR",
            err.to_string(),
        ),
        ProviderError::InvalidId(_) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found at provider".to_string(),
        ),
        ProviderError::Decode(e) => {
            tracing::error!(error = %e, "Provider response did not match the expected shape");
            (
                StatusCode::BAD_GATEWAY,
                "PROVIDER_BAD_RESPONSE",
                "Generation provider returned an unexpected response".to_string(),
            )
        }
        ProviderError::InvalidUrl(_) => internal(),
        ProviderError::Request(e) => {
            tracing::error!(error = %e, "Provider request failed");
            (
                StatusCode::BAD_GATEWAY,
                "PROVIDER_UNAVAILABLE",
                "Generation provider is unreachable".to_string(),
            )
        }
    }
}
