//! Snippet Ingest Layer
//!
//! This is where an uploaded image enters the import pipeline. We take the raw
//! bytes and the declared filename, decide whether they are an image we accept,
//! and give back everything needed to put the file on the shared volume.
//!
//! ## What we do here
//!
//! - **Bound the upload** - [`UploadBuffer`] stops buffering the moment the
//!   configured cap is crossed
//! - **Sniff the type** - magic bytes decide, never the filename extension
//! - **Name the file** - [`PathAllocator`] builds `<volume>/<stamp>_<pod><ext>`
//!   paths that never repeat within a process
//! - **Touch the volume** - [`Volume`] writes each file once and can wipe the
//!   volume contents for a reset
//! - **Log everything** - structured logs via tracing
//!
//! ## Main entry point
//!
//! Call [`ingest`] with an [`UploadedAsset`] and an [`IngestConfig`], get back a
//! [`ValidatedAsset`] or a typed [`IngestError`].
//!
//! ## Example
//!
//! ```
//! use ingest::{ingest, ImageKind, IngestConfig, PathAllocator, UploadedAsset};
//!
//! let config = IngestConfig::default();
//! let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
//!
//! let validated = ingest(UploadedAsset::new("page-01.png", png), &config).unwrap();
//! assert_eq!(validated.kind, ImageKind::Png);
//!
//! let alloc = PathAllocator::new("/snippets/", "import-7d9f");
//! let target = alloc.allocate(&validated.filename);
//! assert!(target.as_string().ends_with("_import-7d9f.png"));
//! ```
use std::time::Instant;

use tracing::{info, warn};

mod config;
mod error;
mod naming;
mod payload;
mod types;
mod volume;

pub use crate::config::{ConfigError, IngestConfig, DEFAULT_MAX_IMAGE_BYTES};
pub use crate::error::IngestError;
pub use crate::naming::{original_extension, PathAllocator, StoredFilePath};
pub use crate::payload::{sniff_content_type, validate_asset, SNIFF_LEN};
pub use crate::types::{ImageKind, UploadBuffer, UploadedAsset, ValidatedAsset};
pub use crate::volume::Volume;

/// Validate an uploaded asset against the size cap and the type allow-list.
pub fn ingest(asset: UploadedAsset, cfg: &IngestConfig) -> Result<ValidatedAsset, IngestError> {
    let start = Instant::now();
    let filename = asset.filename().to_string();
    let sniffed = asset.content_type();
    let declared = asset.declared_content_type().map(str::to_string);
    let size = asset.len();

    match validate_asset(asset, cfg) {
        Ok(validated) => {
            info!(
                filename = %filename,
                kind = %validated.kind,
                size,
                elapsed_micros = start.elapsed().as_micros(),
                "ingest_success"
            );
            Ok(validated)
        }
        Err(err) => {
            warn!(
                filename = %filename,
                sniffed,
                declared = ?declared,
                size,
                error = %err,
                elapsed_micros = start.elapsed().as_micros(),
                "ingest_failure"
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let mut bytes = b"\x89PNG\x0D\x0A\x1A\x0A".to_vec();
        bytes.extend_from_slice(&[0u8; 64]);
        bytes
    }

    #[test]
    fn ingest_keeps_filename_verbatim() {
        let validated = ingest(
            UploadedAsset::new("Scan (1).PNG", png_bytes()),
            &IngestConfig::default(),
        )
        .unwrap();
        assert_eq!(validated.filename, "Scan (1).PNG");
        assert_eq!(validated.extension(), ".PNG");
        assert_eq!(validated.bytes.len(), 72);
    }

    #[test]
    fn ingest_reports_limit_in_error() {
        let cfg = IngestConfig {
            max_image_bytes: 16,
            ..Default::default()
        };
        let err = ingest(UploadedAsset::new("a.png", png_bytes()), &cfg).unwrap_err();
        assert!(err.to_string().contains("16 bytes"));
    }

    #[test]
    fn declared_type_does_not_override_sniffing() {
        let asset = UploadedAsset::new("a.png", b"GIF89a....".to_vec())
            .with_declared_content_type(Some("image/png".into()));
        let err = ingest(asset, &IngestConfig::default()).unwrap_err();
        assert_eq!(err, IngestError::UnsupportedContentType("image/gif".into()));
    }
}
