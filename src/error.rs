//! Failure taxonomy shared by the reset and upload pipelines.
//!
//! The `Display` text of an [`ImportError`] is the plain-text body returned to
//! the caller. Diagnostic detail (collaborator replies, I/O errors) is kept
//! apart in [`ImportError::detail`] and only ever logged.

use std::fmt;

use http::StatusCode;
use ingest::IngestError;
use thiserror::Error;
use upstream::UpstreamError;

/// The two pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pipeline {
    Reset,
    Upload,
}

impl Pipeline {
    pub fn as_str(self) -> &'static str {
        match self {
            Pipeline::Reset => "reset",
            Pipeline::Upload => "upload",
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States of the upload pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UploadStage {
    Authorizing,
    ParsingForm,
    ValidatingPayload,
    Persisting,
    Converting,
    AssemblingRecord,
    Submitting,
    Done,
}

impl UploadStage {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadStage::Authorizing => "authorizing",
            UploadStage::ParsingForm => "parsing_form",
            UploadStage::ValidatingPayload => "validating_payload",
            UploadStage::Persisting => "persisting",
            UploadStage::Converting => "converting",
            UploadStage::AssemblingRecord => "assembling_record",
            UploadStage::Submitting => "submitting",
            UploadStage::Done => "done",
        }
    }
}

/// States of the reset pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResetStage {
    Authorizing,
    ClearingVolume,
    DeletingRecords,
    Done,
}

impl ResetStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ResetStage::Authorizing => "authorizing",
            ResetStage::ClearingVolume => "clearing_volume",
            ResetStage::DeletingRecords => "deleting_records",
            ResetStage::Done => "done",
        }
    }
}

/// Where in which pipeline a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Upload(UploadStage),
    Reset(ResetStage),
}

impl Stage {
    fn authorizing(pipeline: Pipeline) -> Self {
        match pipeline {
            Pipeline::Upload => Stage::Upload(UploadStage::Authorizing),
            Pipeline::Reset => Stage::Reset(ResetStage::Authorizing),
        }
    }

    pub fn pipeline(self) -> Pipeline {
        match self {
            Stage::Upload(_) => Pipeline::Upload,
            Stage::Reset(_) => Pipeline::Reset,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Upload(stage) => stage.as_str(),
            Stage::Reset(stage) => stage.as_str(),
        }
    }
}

/// Coarse failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Credential missing or rejected by the authentication service.
    Authentication,
    /// Valid identity without the admin role.
    Authorization,
    /// Malformed form, missing field, oversize payload or unsupported type.
    ClientInput,
    /// Volume clear or file write failure.
    LocalIo,
    /// Transport failure or unexpected status from a collaborator.
    Upstream,
    /// Undecodable reply from the conversion service.
    ResponseParse,
    /// The pipeline task itself failed.
    Internal,
}

/// A terminal pipeline failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ImportError {
    #[error("[AUTH] {reason}")]
    Unauthenticated {
        pipeline: Pipeline,
        status: StatusCode,
        reason: String,
    },

    #[error("[AUTH] Insufficient permissions to {}", forbidden_action(.pipeline))]
    Forbidden { pipeline: Pipeline },

    #[error("[MICRO-IMPORT] Couldn't parse multipart form (wrong format, network issues ?)")]
    MalformedForm { reason: String },

    #[error("[MICRO-IMPORT] Couldn't parse multipart form (key file probably missing/unreadable)")]
    MissingFile { reason: Option<String> },

    #[error("[MICRO-IMPORT] Image too large (> {limit} bytes)")]
    ImageTooLarge { limit: usize },

    #[error("[MICRO-IMPORT] Unsupported file type")]
    UnsupportedFileType { sniffed: String },

    #[error("[MICRO-IMPORT] Couldn't write provided file {path}")]
    Persist { path: String, reason: String },

    #[error("[MICRO-IMPORT] Error in request to conversion")]
    ConversionRequest { reason: String },

    #[error("[MICRO-IMPORT] Error parsing response from conversion")]
    ConversionResponse { reason: String },

    #[error("[MICRO-IMPORT] Error in request to database")]
    StorageRequest { reason: String },

    /// The insert was accepted but its reply could not be read.
    #[error("[MICRO-IMPORT] Error parsing response from database")]
    StorageResponse { reason: String },

    #[error("[MICRO-IMPORT] Error while cleaning up existing snippets")]
    ClearVolume { reason: String },

    #[error("[MICRO-IMPORT] Error in request to database")]
    DeleteAllRequest { reason: String },

    #[error("[MICRO-IMPORT] Error in response from database")]
    DeleteAllResponse { status: u16, body: String },

    #[error("[MICRO-IMPORT] Internal error")]
    Internal { pipeline: Pipeline, reason: String },
}

fn forbidden_action(pipeline: &Pipeline) -> &'static str {
    match pipeline {
        Pipeline::Reset => "create database",
        Pipeline::Upload => "upload snippets",
    }
}

impl ImportError {
    /// No credential was presented.
    pub fn missing_credential(pipeline: Pipeline) -> Self {
        ImportError::Unauthenticated {
            pipeline,
            status: StatusCode::UNAUTHORIZED,
            reason: "No authorization token provided".into(),
        }
    }

    /// The `Authorization` header does not use the `Bearer` scheme.
    pub fn malformed_credential(pipeline: Pipeline) -> Self {
        ImportError::Unauthenticated {
            pipeline,
            status: StatusCode::BAD_REQUEST,
            reason: "Authorization header must use the Bearer scheme".into(),
        }
    }

    /// The authentication service refused or could not be asked.
    ///
    /// A status reported by the service is passed through verbatim; without
    /// one the failure is ours and maps to 500.
    pub fn authentication(pipeline: Pipeline, err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, body, .. } => {
                let body = body.trim();
                ImportError::Unauthenticated {
                    pipeline,
                    status: StatusCode::from_u16(status).unwrap_or(StatusCode::UNAUTHORIZED),
                    reason: if body.is_empty() {
                        "Invalid token".into()
                    } else {
                        body.to_string()
                    },
                }
            }
            UpstreamError::Transport { .. } | UpstreamError::Config(_) => {
                ImportError::Unauthenticated {
                    pipeline,
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    reason: "Error in request to authentication".into(),
                }
            }
            UpstreamError::ReadBody { .. } | UpstreamError::Decode { .. } => {
                ImportError::Unauthenticated {
                    pipeline,
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    reason: "Error parsing response from authentication".into(),
                }
            }
        }
    }

    pub(crate) fn conversion(err: UpstreamError) -> Self {
        match err {
            UpstreamError::ReadBody { .. } | UpstreamError::Decode { .. } => {
                ImportError::ConversionResponse {
                    reason: err.to_string(),
                }
            }
            _ => ImportError::ConversionRequest {
                reason: err.to_string(),
            },
        }
    }

    pub(crate) fn storage_insert(err: UpstreamError) -> Self {
        match err {
            UpstreamError::ReadBody { .. } | UpstreamError::Decode { .. } => {
                ImportError::StorageResponse {
                    reason: err.to_string(),
                }
            }
            _ => ImportError::StorageRequest {
                reason: err.to_string(),
            },
        }
    }

    pub(crate) fn storage_delete_all(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, body, .. } => {
                ImportError::DeleteAllResponse { status, body }
            }
            _ => ImportError::DeleteAllRequest {
                reason: err.to_string(),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::Unauthenticated { .. } => ErrorKind::Authentication,
            ImportError::Forbidden { .. } => ErrorKind::Authorization,
            ImportError::MalformedForm { .. }
            | ImportError::MissingFile { .. }
            | ImportError::ImageTooLarge { .. }
            | ImportError::UnsupportedFileType { .. } => ErrorKind::ClientInput,
            ImportError::Persist { .. } | ImportError::ClearVolume { .. } => ErrorKind::LocalIo,
            ImportError::ConversionResponse { .. } => ErrorKind::ResponseParse,
            ImportError::ConversionRequest { .. }
            | ImportError::StorageRequest { .. }
            | ImportError::StorageResponse { .. }
            | ImportError::DeleteAllRequest { .. }
            | ImportError::DeleteAllResponse { .. } => ErrorKind::Upstream,
            ImportError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ImportError::Unauthenticated { status, .. } => *status,
            _ => match self.kind() {
                ErrorKind::Authorization => StatusCode::UNAUTHORIZED,
                ErrorKind::ClientInput => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// The stage the failure ended, `None` when the task itself died.
    pub fn stage(&self) -> Option<Stage> {
        let stage = match self {
            ImportError::Unauthenticated { pipeline, .. } | ImportError::Forbidden { pipeline } => {
                Stage::authorizing(*pipeline)
            }
            ImportError::MalformedForm { .. } | ImportError::MissingFile { .. } => {
                Stage::Upload(UploadStage::ParsingForm)
            }
            ImportError::ImageTooLarge { .. } | ImportError::UnsupportedFileType { .. } => {
                Stage::Upload(UploadStage::ValidatingPayload)
            }
            ImportError::Persist { .. } => Stage::Upload(UploadStage::Persisting),
            ImportError::ConversionRequest { .. } | ImportError::ConversionResponse { .. } => {
                Stage::Upload(UploadStage::Converting)
            }
            ImportError::StorageRequest { .. } | ImportError::StorageResponse { .. } => {
                Stage::Upload(UploadStage::Submitting)
            }
            ImportError::ClearVolume { .. } => Stage::Reset(ResetStage::ClearingVolume),
            ImportError::DeleteAllRequest { .. } | ImportError::DeleteAllResponse { .. } => {
                Stage::Reset(ResetStage::DeletingRecords)
            }
            ImportError::Internal { .. } => return None,
        };
        Some(stage)
    }

    pub fn pipeline(&self) -> Pipeline {
        match self {
            ImportError::Internal { pipeline, .. } => *pipeline,
            _ => self.stage().map_or(Pipeline::Upload, Stage::pipeline),
        }
    }

    /// Underlying diagnostic for logs, never shown to the caller.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ImportError::Unauthenticated { .. }
            | ImportError::Forbidden { .. }
            | ImportError::ImageTooLarge { .. } => None,
            ImportError::MissingFile { reason } => reason.as_deref(),
            ImportError::UnsupportedFileType { sniffed } => Some(sniffed),
            ImportError::DeleteAllResponse { body, .. } => Some(body),
            ImportError::MalformedForm { reason }
            | ImportError::Persist { reason, .. }
            | ImportError::ConversionRequest { reason }
            | ImportError::ConversionResponse { reason }
            | ImportError::StorageRequest { reason }
            | ImportError::StorageResponse { reason }
            | ImportError::ClearVolume { reason }
            | ImportError::DeleteAllRequest { reason }
            | ImportError::Internal { reason, .. } => Some(reason),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<IngestError> for ImportError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::PayloadTooLarge { limit, .. } => ImportError::ImageTooLarge { limit },
            IngestError::UnsupportedContentType(sniffed) => {
                ImportError::UnsupportedFileType { sniffed }
            }
            IngestError::Persist { path, reason } => ImportError::Persist { path, reason },
            IngestError::ClearVolume { path, reason } => ImportError::ClearVolume {
                reason: format!("{path}: {reason}"),
            },
            other => ImportError::Internal {
                pipeline: Pipeline::Upload,
                reason: other.to_string(),
            },
        }
    }
}
