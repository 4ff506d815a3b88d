//! Core types flowing through upload validation.
//!
//! ```text
//! multipart chunks ──▶ UploadBuffer ──▶ UploadedAsset ──▶ ValidatedAsset
//!                       (size cap)      (bytes, name,      (accepted
//!                                        sniffed type)      ImageKind)
//! ```
use std::fmt;

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::IngestError;
use crate::naming::original_extension;
use crate::payload::sniff_content_type;

/// Image formats the pipeline knows how to recognize by magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageKind {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl ImageKind {
    pub fn mime(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
        }
    }

    /// Map a sniffed MIME type back to a kind.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(ImageKind::Png),
            "image/jpeg" => Some(ImageKind::Jpeg),
            _ => None,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Accumulates an upload in memory while enforcing the size cap.
///
/// The buffer refuses the chunk that would push it past `limit`, so a caller
/// streaming a multipart field can stop reading as soon as the cap is crossed
/// instead of buffering the whole oversize body.
///
/// ```rust
/// use ingest::{IngestError, UploadBuffer};
///
/// let mut buf = UploadBuffer::new(4);
/// buf.push(b"abc").unwrap();
/// assert!(matches!(buf.push(b"de"), Err(IngestError::PayloadTooLarge { limit: 4, actual: 5 })));
/// ```
#[derive(Debug)]
pub struct UploadBuffer {
    limit: usize,
    buf: BytesMut,
}

impl UploadBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            buf: BytesMut::new(),
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<(), IngestError> {
        let actual = self.buf.len().saturating_add(chunk.len());
        if actual > self.limit {
            return Err(IngestError::PayloadTooLarge {
                limit: self.limit,
                actual,
            });
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Raw inbound file: bytes, declared filename and sniffed content type.
///
/// The content type is sniffed from the bytes at construction time; the
/// filename's extension plays no part in it.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    filename: String,
    bytes: Bytes,
    content_type: &'static str,
    declared_content_type: Option<String>,
}

impl UploadedAsset {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            filename: filename.into(),
            content_type: sniff_content_type(&bytes),
            bytes,
            declared_content_type: None,
        }
    }

    /// Record the client-declared MIME type. Informational only.
    pub fn with_declared_content_type(mut self, content_type: Option<String>) -> Self {
        self.declared_content_type = content_type;
        self
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// MIME type sniffed from the leading bytes.
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn declared_content_type(&self) -> Option<&str> {
        self.declared_content_type.as_deref()
    }

    /// Extension of the declared filename, verbatim (`""` when absent).
    pub fn extension(&self) -> &str {
        original_extension(&self.filename)
    }
}

/// An upload that passed the size and type checks.
#[derive(Debug, Clone)]
pub struct ValidatedAsset {
    pub filename: String,
    pub bytes: Bytes,
    pub kind: ImageKind,
}

impl ValidatedAsset {
    pub fn extension(&self) -> &str {
        original_extension(&self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_accepts_exactly_the_limit() {
        let mut buf = UploadBuffer::new(6);
        buf.push(b"abc").unwrap();
        buf.push(b"def").unwrap();
        assert_eq!(buf.len(), 6);
        assert_eq!(&buf.freeze()[..], b"abcdef");
    }

    #[test]
    fn buffer_keeps_contents_after_rejected_chunk() {
        let mut buf = UploadBuffer::new(3);
        buf.push(b"ab").unwrap();
        assert!(buf.push(b"cd").is_err());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn asset_sniffs_from_bytes_not_name() {
        let asset = UploadedAsset::new("photo.png", &b"plain text, really"[..]);
        assert_eq!(asset.content_type(), "text/plain; charset=utf-8");
        assert_eq!(asset.extension(), ".png");
    }

    #[test]
    fn image_kind_serializes_as_mime() {
        let json = serde_json::to_string(&[ImageKind::Png, ImageKind::Jpeg]).unwrap();
        assert_eq!(json, r#"["image/png","image/jpeg"]"#);
        assert_eq!(ImageKind::from_mime("image/jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_mime("image/gif"), None);
    }
}
