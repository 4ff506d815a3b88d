//! Client for the storage (database) service.

use record::ImportRecord;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::endpoint;
use crate::error::{Service, UpstreamError};

const DELETE_ALL_PATH: &str = "/db/delete/all";
const INSERT_PATH: &str = "/db/insert";

/// Inserts and wipes records in the storage service.
///
/// Both calls forward the caller's own `Authorization` header value; the
/// storage service performs its own authorization.
#[derive(Debug, Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
}

impl StorageClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Delete every record. Success is exactly `200 OK`.
    pub async fn delete_all(&self, credential: &str) -> Result<(), UpstreamError> {
        let service = Service::Storage;
        let response = self
            .http
            .delete(endpoint(&self.base_url, DELETE_ALL_PATH))
            .header(AUTHORIZATION, credential)
            .send()
            .await
            .map_err(|e| UpstreamError::transport(service, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service,
                status: status.as_u16(),
                body,
            });
        }
        debug!("storage_delete_all_complete");
        Ok(())
    }

    /// Insert records. Success is exactly `201 Created`, after which the
    /// response body is drained; a failed drain is still an error even though
    /// the records were accepted.
    pub async fn insert(
        &self,
        records: &[ImportRecord],
        credential: &str,
    ) -> Result<(), UpstreamError> {
        let service = Service::Storage;
        let response = self
            .http
            .post(endpoint(&self.base_url, INSERT_PATH))
            .header(AUTHORIZATION, credential)
            .json(records)
            .send()
            .await
            .map_err(|e| UpstreamError::transport(service, e))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service,
                status: status.as_u16(),
                body,
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| UpstreamError::read_body(service, e))?;
        debug!(count = records.len(), "storage_insert_complete");
        Ok(())
    }
}
