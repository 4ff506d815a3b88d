//! Reset and upload endpoints.
//!
//! Handlers authorize first, then parse, then hand the remaining work to a
//! spawned task and await it. The task keeps running when the client goes
//! away, so outbound calls already in flight are never cut short.

use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use ingest::{UploadBuffer, UploadedAsset};
use snippet_import::{report, ImportError, Pipeline};
use tokio::task::JoinError;

use crate::error::ServerResult;
use crate::state::ServerState;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// Log and count a failure raised outside the pipelines.
fn failed(err: ImportError) -> ImportError {
    report(&err);
    err
}

fn aborted(pipeline: Pipeline, err: JoinError) -> ImportError {
    failed(ImportError::Internal {
        pipeline,
        reason: err.to_string(),
    })
}

/// `POST /createDB`: clear the volume and wipe the storage service.
pub async fn create_db(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> ServerResult<StatusCode> {
    let caller = state
        .pipeline
        .authorize(Pipeline::Reset, authorization(&headers))
        .await?;

    let pipeline = state.pipeline.clone();
    tokio::spawn(async move { pipeline.reset(&caller).await })
        .await
        .map_err(|err| aborted(Pipeline::Reset, err))??;

    Ok(StatusCode::OK)
}

/// `POST /upload`: store one image and register it. Responds with the
/// stamp of the stored file.
pub async fn upload(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<String> {
    let caller = state
        .pipeline
        .authorize(Pipeline::Upload, authorization(&headers))
        .await?;

    let mut multipart = multipart.map_err(|rejection| {
        failed(ImportError::MalformedForm {
            reason: rejection.body_text(),
        })
    })?;
    let limit = state.pipeline.config().ingest.max_image_bytes;
    let asset = read_file_field(&mut multipart, limit)
        .await
        .map_err(failed)?;

    let pipeline = state.pipeline.clone();
    let receipt = tokio::spawn(async move { pipeline.upload(&caller, asset).await })
        .await
        .map_err(|err| aborted(Pipeline::Upload, err))??;

    Ok(receipt.token())
}

/// Buffer the first `file` field that carries a filename.
///
/// Other fields are skipped. A body cut off by the form limit reports the
/// image limit, like an image that is too large on its own.
async fn read_file_field(
    multipart: &mut Multipart,
    limit: usize,
) -> Result<UploadedAsset, ImportError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ImportError::MissingFile { reason: None }),
            Err(err) => {
                return Err(classify(err, limit, |reason| ImportError::MalformedForm {
                    reason,
                }))
            }
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        return buffer_field(field, filename, limit).await;
    }
}

async fn buffer_field(
    mut field: Field<'_>,
    filename: String,
    limit: usize,
) -> Result<UploadedAsset, ImportError> {
    let declared = field.content_type().map(str::to_string);
    let mut buffer = UploadBuffer::new(limit);
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => buffer.push(&chunk)?,
            Ok(None) => break,
            Err(err) => {
                return Err(classify(err, limit, |reason| ImportError::MissingFile {
                    reason: Some(reason),
                }))
            }
        }
    }
    Ok(UploadedAsset::new(filename, buffer.freeze()).with_declared_content_type(declared))
}

fn classify(
    err: MultipartError,
    limit: usize,
    otherwise: impl FnOnce(String) -> ImportError,
) -> ImportError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ImportError::ImageTooLarge { limit }
    } else {
        otherwise(err.body_text())
    }
}
