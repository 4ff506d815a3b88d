//! Workspace umbrella crate for snippet import.
//!
//! Ties the upload validation and volume handling of [`ingest`], the wire
//! model of [`record`] and the service clients of [`upstream`] into two
//! pipelines behind one authorization guard:
//!
//! - **reset**: authorize, clear the volume, delete every stored record
//! - **upload**: authorize, validate, persist, convert, assemble, submit
//!
//! ```rust,no_run
//! use snippet_import::{
//!     ImportPipeline, Pipeline, PipelineConfig, UploadedAsset, UpstreamClients, UpstreamConfig,
//! };
//!
//! # async fn run(png: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let clients = UpstreamClients::new(&UpstreamConfig::default())?;
//! let pipeline = ImportPipeline::with_clients(PipelineConfig::new("/snippets/", "pod-0"), clients)?;
//!
//! let caller = pipeline
//!     .authorize(Pipeline::Upload, Some("Bearer admin-token"))
//!     .await?;
//! let receipt = pipeline
//!     .upload(&caller, UploadedAsset::new("page.png", png))
//!     .await?;
//! println!("stored {} as {}", receipt.token(), receipt.path);
//! # Ok(())
//! # }
//! ```

mod collaborators;
mod config;
mod error;
mod pipeline;
mod telemetry;

pub use crate::collaborators::{Authenticator, Converter, RecordStore};
pub use crate::config::{ConfigError, PipelineConfig};
pub use crate::error::{ErrorKind, ImportError, Pipeline, ResetStage, Stage, UploadStage};
pub use crate::pipeline::{report, Authorized, ImportPipeline, UploadReceipt};
pub use crate::telemetry::{
    describe as describe_metrics, FAILURES_TOTAL, PIPELINE_DURATION, REQUESTS_TOTAL,
};

pub use ingest::{IngestConfig, IngestError, UploadBuffer, UploadedAsset};
pub use record::{AnnotationDocument, ImportRecord, Principal, Role};
pub use upstream::{UpstreamClients, UpstreamConfig, UpstreamError};
