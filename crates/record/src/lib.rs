//! Wire data model for the snippet import service.
//!
//! Everything in this crate is plain data exchanged with the collaborating
//! services, serialized with the PascalCase field names those services speak:
//!
//! - [`AnnotationDocument`] - structured output of the conversion service
//! - [`ImportRecord`] - the unit handed to the storage service
//! - [`Principal`] / [`Role`] - identity returned by the authentication service
//! - [`VerifyTokenRequest`] / [`ConversionRequest`] - outbound request bodies
//!
//! ## Example
//!
//! ```
//! use record::{AnnotationDocument, ImportRecord};
//!
//! let doc = AnnotationDocument::default();
//! let record = ImportRecord::new(doc, "/snippets/1_pod.png", "scan.png");
//!
//! assert!(!record.annotated);
//! assert!(record.annotator.is_empty());
//! ```

mod document;
mod principal;
mod record;
mod requests;
mod serde_null;

pub use crate::document::{AnnotationDocument, DataField, Location, Meta, Point};
pub use crate::principal::{Principal, Role};
pub use crate::record::ImportRecord;
pub use crate::requests::{ConversionRequest, VerifyTokenRequest};
