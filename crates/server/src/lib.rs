//! Snippet import server - HTTP front-door for the import pipelines
//!
//! Exposes the reset and upload pipelines of [`snippet_import`] over axum.
//! Every error is returned as a plain-text body with the matching status.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Endpoints
//!
//! Paths below use the default `/import` prefix.
//!
//! - `GET /import` - home, no authentication
//! - `POST /import/createDB` - reset the volume and the storage service (admin)
//! - `POST /import/upload` - upload one image in multipart field `file` (admin)
//! - `GET /metrics` - Prometheus metrics, no authentication

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, install_metrics, start_server};
pub use state::ServerState;
