use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context};
use ingest::IngestConfig;
use serde::{Deserialize, Serialize};
use snippet_import::PipelineConfig;
use upstream::UpstreamConfig;

/// Unprefixed variables kept from earlier deployments, mapped to their keys.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("DATABASE_API_URL", "storage_url"),
    ("CONVERSION_API_URL", "conversion_url"),
    ("AUTH_API_URL", "auth_url"),
    ("VOLUME_PATH", "volume_path"),
    ("POD_NAME", "pod_name"),
];

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prefix of the home, reset and upload routes. `/metrics` is never prefixed.
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,

    /// Storage (database) service base URL
    #[serde(default = "default_storage_url")]
    pub storage_url: String,

    /// Conversion service base URL
    #[serde(default = "default_conversion_url")]
    pub conversion_url: String,

    /// Authentication service base URL
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Shared volume receiving uploaded images
    #[serde(default = "default_volume_path")]
    pub volume_path: String,

    /// Pod identity; the host name when left empty
    #[serde(default)]
    pub pod_name: String,

    /// Largest accepted image in bytes
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// Largest accepted multipart body in bytes
    #[serde(default = "default_max_form_bytes")]
    pub max_form_bytes: usize,

    /// Deadline for a whole outbound call
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// Deadline for establishing an outbound connection
    #[serde(default = "default_upstream_connect_timeout_secs")]
    pub upstream_connect_timeout_secs: u64,

    /// Remove stored files whose conversion or submission failed
    #[serde(default)]
    pub remove_orphans_on_failure: bool,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            log_level: default_log_level(),
            route_prefix: default_route_prefix(),
            storage_url: default_storage_url(),
            conversion_url: default_conversion_url(),
            auth_url: default_auth_url(),
            volume_path: default_volume_path(),
            pod_name: String::new(),
            max_image_bytes: default_max_image_bytes(),
            max_form_bytes: default_max_form_bytes(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
            upstream_connect_timeout_secs: default_upstream_connect_timeout_secs(),
            remove_orphans_on_failure: false,
            metrics_enabled: default_true(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from config files and environment variables
    ///
    /// Sources, lowest precedence first: an optional `import` config file,
    /// `IMPORT_SERVER__*` variables, then the legacy unprefixed variables.
    /// An empty pod name falls back to the host name.
    pub fn load() -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("import").required(false))
            .add_source(config::Environment::with_prefix("IMPORT_SERVER").separator("__"));

        for (var, key) in LEGACY_ENV {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;
        if config.pod_name.trim().is_empty() {
            config.pod_name = host_name()?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipelines cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_image_bytes > self.max_form_bytes {
            bail!(
                "max_image_bytes ({}) must not exceed max_form_bytes ({})",
                self.max_image_bytes,
                self.max_form_bytes
            );
        }
        self.socket_addr()?;
        self.upstream_config().validate()?;
        self.pipeline_config().validate()?;
        Ok(())
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        addr_str
            .parse()
            .with_context(|| format!("invalid bind address {addr_str}"))
    }

    /// Route prefix without a trailing slash; empty means the root.
    pub fn route_prefix(&self) -> String {
        let trimmed = self.route_prefix.trim().trim_end_matches('/');
        if trimmed.is_empty() || trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        }
    }

    pub fn upstream_config(&self) -> UpstreamConfig {
        UpstreamConfig {
            auth_url: self.auth_url.clone(),
            conversion_url: self.conversion_url.clone(),
            storage_url: self.storage_url.clone(),
            timeout_secs: self.upstream_timeout_secs,
            connect_timeout_secs: self.upstream_connect_timeout_secs,
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            volume_path: PathBuf::from(&self.volume_path),
            pod_name: self.pod_name.clone(),
            ingest: IngestConfig {
                max_image_bytes: self.max_image_bytes,
                ..Default::default()
            },
            remove_orphans_on_failure: self.remove_orphans_on_failure,
        }
    }
}

fn host_name() -> anyhow::Result<String> {
    hostname::get()
        .context("cannot resolve host name for pod_name")?
        .into_string()
        .map_err(|raw| anyhow::anyhow!("host name {raw:?} is not valid UTF-8"))
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_route_prefix() -> String {
    "/import".to_string()
}

fn default_storage_url() -> String {
    UpstreamConfig::default().storage_url
}

fn default_conversion_url() -> String {
    UpstreamConfig::default().conversion_url
}

fn default_auth_url() -> String {
    UpstreamConfig::default().auth_url
}

fn default_volume_path() -> String {
    "/snippets/".to_string()
}

fn default_max_image_bytes() -> usize {
    ingest::DEFAULT_MAX_IMAGE_BYTES
}

fn default_max_form_bytes() -> usize {
    33 << 20
}

fn default_upstream_timeout_secs() -> u64 {
    30
}

fn default_upstream_connect_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}
