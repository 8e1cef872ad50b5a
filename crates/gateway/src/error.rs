use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use fetcher::FetchError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

// Convenience type alias
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// HTTP status, error code, and client-facing message.
    /// Server-side failures are sanitized so filesystem details stay in the logs.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Fetch(err) => {
                let status = match err {
                    FetchError::ConfigurationInvalid(_) => StatusCode::BAD_REQUEST,
                    FetchError::SourceNotFound(_) => StatusCode::NOT_FOUND,
                    FetchError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                    FetchError::ListFailure { .. }
                    | FetchError::ReadFailure { .. }
                    | FetchError::Pattern(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Fetch error: {}", err);
                    "Failed to read log sources".to_string()
                } else {
                    err.to_string()
                };
                (status, err.code(), message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}
