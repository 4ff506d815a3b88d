//! HTTP clients for the services the import front-door depends on.
//!
//! - [`AuthClient`] verifies a caller's token and returns a [`record::Principal`]
//! - [`ConversionClient`] turns a stored image path into a [`record::AnnotationDocument`]
//! - [`StorageClient`] inserts [`record::ImportRecord`]s and wipes the store
//!
//! All three share one pooled `reqwest::Client` with explicit deadlines, built
//! from [`UpstreamConfig`]. None of them retries: every failure goes straight
//! back to the caller as an [`UpstreamError`].
//!
//! ```rust,no_run
//! use upstream::{UpstreamClients, UpstreamConfig};
//!
//! # async fn run() -> Result<(), upstream::UpstreamError> {
//! let clients = UpstreamClients::new(&UpstreamConfig::default())?;
//! let document = clients.conversion.convert("/snippets/1_pod.png").await?;
//! println!("{} regions", document.location.len());
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod conversion;
mod error;
mod storage;

pub use crate::auth::{bearer_token, AuthClient};
pub use crate::config::UpstreamConfig;
pub use crate::conversion::ConversionClient;
pub use crate::error::{Service, UpstreamError};
pub use crate::storage::StorageClient;

/// The three service clients, built over one shared connection pool.
#[derive(Debug, Clone)]
pub struct UpstreamClients {
    pub auth: AuthClient,
    pub conversion: ConversionClient,
    pub storage: StorageClient,
}

impl UpstreamClients {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self, UpstreamError> {
        cfg.validate()?;
        let http = cfg.build_http_client()?;
        Ok(Self {
            auth: AuthClient::new(http.clone(), cfg.auth_url.clone()),
            conversion: ConversionClient::new(http.clone(), cfg.conversion_url.clone()),
            storage: StorageClient::new(http, cfg.storage_url.clone()),
        })
    }
}
