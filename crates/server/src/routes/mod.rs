//! Route handlers
//!
//! - `import`: reset (`/createDB`) and upload (`/upload`)
//! - `health`: Prometheus metrics

pub mod health;
pub mod import;

use crate::error::ServerError;

/// Body of the home route.
pub const HOME_MESSAGE: &str = "you're talking to the import microservice";

/// Liveness/home endpoint. Requires no authentication.
pub async fn home() -> &'static str {
    HOME_MESSAGE
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
