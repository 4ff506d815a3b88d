//! Configuration types for upload validation.
//!
//! [`IngestConfig`] bounds what the upload pipeline is willing to accept. It is
//! cheap to clone and deserializes from any serde format, so the server can
//! embed it directly in its own configuration.
//!
//! # Quick Start
//!
//! ```rust
//! use ingest::IngestConfig;
//!
//! let config = IngestConfig::default();
//! assert_eq!(config.max_image_bytes, 32 << 20);
//! config.validate().expect("defaults are valid");
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ImageKind;

/// Default cap on a single uploaded image: 32 MiB.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 32 << 20;

/// Runtime configuration for upload validation.
///
/// # Fields
///
/// - `max_image_bytes`: hard cap on the buffered file; larger files are
///   rejected before anything touches the volume
/// - `accepted_types`: image formats accepted after magic-byte sniffing
///
/// # Serialization
///
/// ```json
/// {
///   "max_image_bytes": 33554432,
///   "accepted_types": ["image/png", "image/jpeg"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum accepted file size in bytes.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// Formats accepted after sniffing. The filename extension never counts.
    #[serde(default = "default_accepted_types")]
    pub accepted_types: Vec<ImageKind>,
}

/// Errors produced by [`IngestConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A zero cap would reject every upload.
    #[error("max_image_bytes must be greater than zero")]
    ZeroImageLimit,

    /// No format accepted means every upload is rejected.
    #[error("accepted_types must name at least one image format")]
    NoAcceptedTypes,
}

impl Default for IngestConfig {
    /// PNG and JPEG up to 32 MiB.
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
            accepted_types: default_accepted_types(),
        }
    }
}

impl IngestConfig {
    /// Check the configuration for internal consistency.
    ///
    /// Call once at startup; the checks are purely in-memory.
    ///
    /// ```rust
    /// use ingest::{ConfigError, IngestConfig};
    ///
    /// let bad = IngestConfig {
    ///     max_image_bytes: 0,
    ///     ..Default::default()
    /// };
    /// assert_eq!(bad.validate(), Err(ConfigError::ZeroImageLimit));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_image_bytes == 0 {
            return Err(ConfigError::ZeroImageLimit);
        }
        if self.accepted_types.is_empty() {
            return Err(ConfigError::NoAcceptedTypes);
        }
        Ok(())
    }

    pub fn accepts(&self, kind: ImageKind) -> bool {
        self.accepted_types.contains(&kind)
    }
}

fn default_max_image_bytes() -> usize {
    DEFAULT_MAX_IMAGE_BYTES
}

fn default_accepted_types() -> Vec<ImageKind> {
    vec![ImageKind::Png, ImageKind::Jpeg]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_accept_png_and_jpeg() {
        let cfg = IngestConfig::default();
        assert!(cfg.accepts(ImageKind::Png));
        assert!(cfg.accepts(ImageKind::Jpeg));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_accept_list_is_invalid() {
        let cfg = IngestConfig {
            accepted_types: Vec::new(),
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoAcceptedTypes));
    }

    #[test]
    fn deserializes_with_defaults() {
        let cfg: IngestConfig = serde_json::from_str(r#"{"max_image_bytes": 1024}"#).unwrap();
        assert_eq!(cfg.max_image_bytes, 1024);
        assert_eq!(cfg.accepted_types, default_accepted_types());

        let cfg: IngestConfig =
            serde_json::from_str(r#"{"accepted_types": ["image/png"]}"#).unwrap();
        assert_eq!(cfg.accepted_types, vec![ImageKind::Png]);
        assert!(!cfg.accepts(ImageKind::Jpeg));
    }
}
