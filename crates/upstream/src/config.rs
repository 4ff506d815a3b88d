use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;

/// Base URLs and deadlines for the collaborating services.
///
/// Every outbound call carries an explicit deadline; nothing waits on
/// transport defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Authentication service base URL.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Conversion service base URL.
    #[serde(default = "default_conversion_url")]
    pub conversion_url: String,

    /// Storage (database) service base URL.
    #[serde(default = "default_storage_url")]
    pub storage_url: String,

    /// Whole-request deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment deadline in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            conversion_url: default_conversion_url(),
            storage_url: default_storage_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Reject empty URLs and zero deadlines.
    pub fn validate(&self) -> Result<(), UpstreamError> {
        for (name, url) in [
            ("auth_url", &self.auth_url),
            ("conversion_url", &self.conversion_url),
            ("storage_url", &self.storage_url),
        ] {
            if url.trim().is_empty() {
                return Err(UpstreamError::Config(format!("{name} must not be empty")));
            }
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(UpstreamError::Config(
                "upstream timeouts must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Build the HTTP client shared by all three service clients.
    pub fn build_http_client(&self) -> Result<reqwest::Client, UpstreamError> {
        reqwest::Client::builder()
            .timeout(self.timeout())
            .connect_timeout(self.connect_timeout())
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| UpstreamError::Config(format!("failed to build HTTP client: {e}")))
    }
}

/// Join a base URL and an absolute endpoint path without doubling slashes.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn default_auth_url() -> String {
    "http://auth-api.gitlab-managed-apps.svc.cluster.local:8080".to_string()
}

fn default_conversion_url() -> String {
    "http://conversion-api.gitlab-managed-apps.svc.cluster.local:12345".to_string()
}

fn default_storage_url() -> String {
    "http://database-api.gitlab-managed-apps.svc.cluster.local:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}
