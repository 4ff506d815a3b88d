//! Seams to the three collaborating services.
//!
//! The pipeline only talks to these traits; the `upstream` HTTP clients are
//! the production implementations and tests substitute in-process fakes.

use async_trait::async_trait;
use record::{AnnotationDocument, ImportRecord, Principal};
use upstream::{AuthClient, ConversionClient, StorageClient, UpstreamError};

/// Exchanges a bearer token for a [`Principal`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Principal, UpstreamError>;
}

/// Produces the annotation document for an image already on the volume.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, path: &str) -> Result<AnnotationDocument, UpstreamError>;
}

/// Durable store of import records.
///
/// `credential` is the caller's raw `Authorization` header value, forwarded
/// untouched.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, records: &[ImportRecord], credential: &str)
    -> Result<(), UpstreamError>;

    async fn delete_all(&self, credential: &str) -> Result<(), UpstreamError>;
}

#[async_trait]
impl Authenticator for AuthClient {
    async fn verify(&self, token: &str) -> Result<Principal, UpstreamError> {
        AuthClient::verify(self, token).await
    }
}

#[async_trait]
impl Converter for ConversionClient {
    async fn convert(&self, path: &str) -> Result<AnnotationDocument, UpstreamError> {
        ConversionClient::convert(self, path).await
    }
}

#[async_trait]
impl RecordStore for StorageClient {
    async fn insert(
        &self,
        records: &[ImportRecord],
        credential: &str,
    ) -> Result<(), UpstreamError> {
        StorageClient::insert(self, records, credential).await
    }

    async fn delete_all(&self, credential: &str) -> Result<(), UpstreamError> {
        StorageClient::delete_all(self, credential).await
    }
}
