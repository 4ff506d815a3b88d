use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use snippet_import::ImportError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
///
/// Every error renders as a plain-text body; no structured error payload is
/// ever returned.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("[MICRO-IMPORT] Not found")]
    NotFound,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Import(err) => err.status(),
            ServerError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
