//! Error types produced by the ingest crate.
//!
//! # Error Categories
//!
//! | Error | Category | HTTP |
//! |-------|----------|------|
//! | [`PayloadTooLarge`](IngestError::PayloadTooLarge) | Client input | 400 |
//! | [`UnsupportedContentType`](IngestError::UnsupportedContentType) | Client input | 400 |
//! | [`Persist`](IngestError::Persist) | Local I/O | 500 |
//! | [`ClearVolume`](IngestError::ClearVolume) | Local I/O | 500 |
//!
//! Oversize payloads map to 400 rather than 413: the import front-door has
//! always reported them as a bad request that names the byte limit.
//!
//! # Example
//!
//! ```rust
//! use ingest::IngestError;
//!
//! fn describe(error: &IngestError) -> String {
//!     match error {
//!         IngestError::PayloadTooLarge { limit, .. } => format!("keep it under {limit} bytes"),
//!         IngestError::UnsupportedContentType(sniffed) => format!("{sniffed} is not an image we take"),
//!         other => other.to_string(),
//!     }
//! }
//!
//! let err = IngestError::UnsupportedContentType("text/plain; charset=utf-8".into());
//! assert!(describe(&err).contains("text/plain"));
//! ```
use thiserror::Error;

/// Errors that can occur while validating or persisting an upload.
///
/// All variants are cloneable and comparable so tests can match on them
/// exactly; I/O failures keep the rendered OS error text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// Buffered file exceeds the configured cap.
    #[error("image too large (> {limit} bytes)")]
    PayloadTooLarge {
        /// Configured cap in bytes.
        limit: usize,
        /// Bytes seen before the upload was rejected.
        actual: usize,
    },

    /// Magic-byte sniffing found something other than an accepted image.
    #[error("unsupported file type: {0}")]
    UnsupportedContentType(String),

    /// Opening, writing or closing the stored file failed.
    #[error("cannot write file {path}: {reason}")]
    Persist { path: String, reason: String },

    /// Clearing the volume contents failed.
    #[error("cannot clear volume {path}: {reason}")]
    ClearVolume { path: String, reason: String },
}
