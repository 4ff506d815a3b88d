use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use snippet_import::ImportPipeline;
use upstream::UpstreamClients;

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Reset and upload pipelines over the service clients
    pub pipeline: ImportPipeline,

    /// Prometheus render handle; `None` when metrics are disabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        pipeline: ImportPipeline,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
            metrics,
        }
    }

    /// Build the pipeline over HTTP clients for the configured services
    pub fn from_config(
        config: ServerConfig,
        metrics: Option<PrometheusHandle>,
    ) -> anyhow::Result<Self> {
        let clients = UpstreamClients::new(&config.upstream_config())?;
        let pipeline = ImportPipeline::with_clients(config.pipeline_config(), clients)?;
        Ok(Self::new(config, pipeline, metrics))
    }
}
