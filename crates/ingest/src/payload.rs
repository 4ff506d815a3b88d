//! Payload validation: size cap and magic-byte content sniffing.
//!
//! Only the leading bytes of a file decide its type. A text file posted as
//! `scan.png` sniffs as `text/plain` and is rejected here, long before the
//! extension matters for naming the stored file.
//!
//! # Validation Flow
//!
//! ```text
//! UploadedAsset
//!        │
//!        ▼
//! ┌─────────────────────────────┐
//! │ 1. Size cap                 │
//! │    len <= max_image_bytes   │
//! ├─────────────────────────────┤
//! │ 2. Sniffed type             │
//! │    image/png | image/jpeg   │
//! └─────────────────────────────┘
//!        │
//!        ▼
//! ValidatedAsset
//! ```
use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::types::{ImageKind, UploadedAsset, ValidatedAsset};

/// Number of leading bytes considered when sniffing.
pub const SNIFF_LEN: usize = 512;

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"BM", "image/bmp"),
    (b"\x00\x00\x01\x00", "image/x-icon"),
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
];

/// Detect the MIME type of `data` from its magic bytes.
///
/// Falls back to `text/plain; charset=utf-8` when the head contains no
/// binary control bytes, and `application/octet-stream` otherwise.
///
/// ```rust
/// use ingest::sniff_content_type;
///
/// assert_eq!(sniff_content_type(b"\x89PNG\r\n\x1a\n...."), "image/png");
/// assert_eq!(sniff_content_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
/// assert_eq!(sniff_content_type(b"test"), "text/plain; charset=utf-8");
/// ```
pub fn sniff_content_type(data: &[u8]) -> &'static str {
    let head = &data[..data.len().min(SNIFF_LEN)];

    for &(magic, mime) in SIGNATURES {
        if head.starts_with(magic) {
            return mime;
        }
    }

    if head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        return "image/webp";
    }

    if head.iter().any(|b| is_binary_byte(*b)) {
        "application/octet-stream"
    } else {
        "text/plain; charset=utf-8"
    }
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// Apply the size cap, then the content-type allow-list.
///
/// The size check runs first so an oversize upload is always reported as
/// such, whatever its bytes look like.
pub fn validate_asset(
    asset: UploadedAsset,
    cfg: &IngestConfig,
) -> Result<ValidatedAsset, IngestError> {
    if asset.len() > cfg.max_image_bytes {
        return Err(IngestError::PayloadTooLarge {
            limit: cfg.max_image_bytes,
            actual: asset.len(),
        });
    }

    let kind = ImageKind::from_mime(asset.content_type())
        .filter(|kind| cfg.accepts(*kind))
        .ok_or_else(|| IngestError::UnsupportedContentType(asset.content_type().to_string()))?;

    Ok(ValidatedAsset {
        filename: asset.filename().to_string(),
        bytes: asset.bytes().clone(),
        kind,
    })
}
