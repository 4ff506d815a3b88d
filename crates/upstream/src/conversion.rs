//! Client for the conversion service.

use record::{AnnotationDocument, ConversionRequest};
use tracing::debug;

use crate::config::endpoint;
use crate::error::{Service, UpstreamError};

const CONVERT_PATH: &str = "/convert/nothing";

/// Asks the conversion service for the annotation document of a stored image.
#[derive(Debug, Clone)]
pub struct ConversionClient {
    http: reqwest::Client,
    base_url: String,
}

impl ConversionClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Submit the stored path (never the bytes) and decode the reply.
    ///
    /// The three failure points stay distinct: transport, body read and JSON
    /// decode. A non-2xx reply is reported as a status error.
    pub async fn convert(&self, path: &str) -> Result<AnnotationDocument, UpstreamError> {
        let service = Service::Conversion;
        let response = self
            .http
            .post(endpoint(&self.base_url, CONVERT_PATH))
            .json(&ConversionRequest {
                path: path.to_string(),
            })
            .send()
            .await
            .map_err(|e| UpstreamError::transport(service, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::read_body(service, e))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                service,
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let document: AnnotationDocument =
            serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode {
                service,
                reason: e.to_string(),
            })?;
        debug!(
            path,
            locations = document.location.len(),
            fields = document.data.len(),
            "conversion_complete"
        );
        Ok(document)
    }
}
