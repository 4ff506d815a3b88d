//! Pipeline configuration.
//!
//! Built once at startup (the server fills it from its own layered config),
//! validated, then shared read-only by every request.

use std::path::PathBuf;

use ingest::IngestConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by [`PipelineConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("volume_path must not be empty")]
    EmptyVolumePath,

    #[error("pod_name must not be empty")]
    EmptyPodName,

    /// The pod name is embedded in file names on the shared volume.
    #[error("pod_name {0:?} must not contain a path separator")]
    InvalidPodName(String),

    #[error(transparent)]
    Ingest(#[from] ingest::ConfigError),
}

/// Immutable settings for the reset and upload pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root of the shared volume that receives uploaded images.
    #[serde(default = "default_volume_path")]
    pub volume_path: PathBuf,

    /// Per-process label salted into every stored file name.
    pub pod_name: String,

    /// Size cap and accepted formats.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Remove the stored file when conversion or submission fails.
    ///
    /// Off by default: the file then stays on the volume unreferenced.
    #[serde(default)]
    pub remove_orphans_on_failure: bool,
}

impl PipelineConfig {
    pub fn new(volume_path: impl Into<PathBuf>, pod_name: impl Into<String>) -> Self {
        Self {
            volume_path: volume_path.into(),
            pod_name: pod_name.into(),
            ingest: IngestConfig::default(),
            remove_orphans_on_failure: false,
        }
    }

    pub fn with_max_image_bytes(mut self, limit: usize) -> Self {
        self.ingest.max_image_bytes = limit;
        self
    }

    pub fn with_orphan_cleanup(mut self, enabled: bool) -> Self {
        self.remove_orphans_on_failure = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.volume_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyVolumePath);
        }
        if self.pod_name.trim().is_empty() {
            return Err(ConfigError::EmptyPodName);
        }
        if self.pod_name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidPodName(self.pod_name.clone()));
        }
        self.ingest.validate()?;
        Ok(())
    }
}

fn default_volume_path() -> PathBuf {
    PathBuf::from("/snippets/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_limits() {
        let cfg = PipelineConfig::new("/snippets/", "import-0");
        assert_eq!(cfg.ingest.max_image_bytes, 32 << 20);
        assert!(!cfg.remove_orphans_on_failure);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn pod_name_must_be_a_plain_label() {
        assert_eq!(
            PipelineConfig::new("/v", " ").validate(),
            Err(ConfigError::EmptyPodName)
        );
        assert_eq!(
            PipelineConfig::new("/v", "a/b").validate(),
            Err(ConfigError::InvalidPodName("a/b".into()))
        );
    }

    #[test]
    fn ingest_errors_surface() {
        let cfg = PipelineConfig::new("/v", "pod").with_max_image_bytes(0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Ingest(ingest::ConfigError::ZeroImageLimit))
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let cfg: PipelineConfig = serde_json::from_str(r#"{"pod_name": "pod-a"}"#).unwrap();
        assert_eq!(cfg.volume_path, PathBuf::from("/snippets/"));
        assert_eq!(cfg.ingest, IngestConfig::default());
    }
}
