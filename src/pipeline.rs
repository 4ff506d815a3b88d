//! The authorization guard and the reset and upload pipelines.
//!
//! Both pipelines are best-effort and non-transactional. Every failure is
//! terminal for the request and nothing already done is rolled back: a reset
//! that fails at the storage service leaves the volume cleared, and an upload
//! that fails after persisting leaves its file on the volume unless
//! [`PipelineConfig::remove_orphans_on_failure`] is set.

use std::sync::Arc;
use std::time::Instant;

use ingest::{PathAllocator, StoredFilePath, UploadedAsset, ValidatedAsset, Volume};
use record::{ImportRecord, Principal};
use tracing::{debug, error, info, warn};
use upstream::{bearer_token, UpstreamClients, UpstreamError};

use crate::collaborators::{Authenticator, Converter, RecordStore};
use crate::config::{ConfigError, PipelineConfig};
use crate::error::{ImportError, Pipeline, ResetStage, UploadStage};
use crate::telemetry;

/// Proof that the guard admitted a caller.
///
/// Only [`ImportPipeline::authorize`] creates one, so the pipelines cannot run
/// ahead of the guard.
#[derive(Debug, Clone)]
pub struct Authorized {
    principal: Principal,
    credential: String,
}

impl Authorized {
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Raw `Authorization` header value, forwarded to the storage service.
    pub fn credential(&self) -> &str {
        &self.credential
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub stamp: i64,
    pub path: StoredFilePath,
}

impl UploadReceipt {
    /// Correlation token returned to the caller: the decimal stamp.
    pub fn token(&self) -> String {
        self.stamp.to_string()
    }
}

/// Orchestrates both pipelines over injected collaborators.
///
/// Cheap to clone; clones share configuration, the path allocator and the
/// collaborators.
#[derive(Clone)]
pub struct ImportPipeline {
    config: Arc<PipelineConfig>,
    allocator: Arc<PathAllocator>,
    volume: Volume,
    auth: Arc<dyn Authenticator>,
    converter: Arc<dyn Converter>,
    store: Arc<dyn RecordStore>,
}

impl std::fmt::Debug for ImportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportPipeline")
            .field("config", &self.config)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

impl ImportPipeline {
    pub fn new(
        config: PipelineConfig,
        auth: Arc<dyn Authenticator>,
        converter: Arc<dyn Converter>,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let allocator = PathAllocator::new(config.volume_path.clone(), config.pod_name.clone());
        let volume = Volume::new(config.volume_path.clone());
        Ok(Self {
            config: Arc::new(config),
            allocator: Arc::new(allocator),
            volume,
            auth,
            converter,
            store,
        })
    }

    /// Wire the pipeline to the HTTP clients of the real services.
    pub fn with_clients(
        config: PipelineConfig,
        clients: UpstreamClients,
    ) -> Result<Self, ConfigError> {
        Self::new(
            config,
            Arc::new(clients.auth),
            Arc::new(clients.conversion),
            Arc::new(clients.storage),
        )
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Admit only admin principals. Runs before any side effect.
    ///
    /// `header` is the raw `Authorization` value. A missing or blank header is
    /// rejected with 401 and a header without the `Bearer` scheme with 400,
    /// both without calling the authentication service.
    pub async fn authorize(
        &self,
        pipeline: Pipeline,
        header: Option<&str>,
    ) -> Result<Authorized, ImportError> {
        // Resets are counted on arrival, uploads only once admitted.
        if pipeline == Pipeline::Reset {
            telemetry::record_request();
        }
        let result = self.check_credential(pipeline, header).await;
        match &result {
            Ok(authorized) => {
                if pipeline == Pipeline::Upload {
                    telemetry::record_request();
                }
                debug!(
                    pipeline = pipeline.as_str(),
                    username = %authorized.principal.username,
                    "caller_authorized"
                );
            }
            Err(err) => report(err),
        }
        result
    }

    async fn check_credential(
        &self,
        pipeline: Pipeline,
        header: Option<&str>,
    ) -> Result<Authorized, ImportError> {
        let credential = header
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ImportError::missing_credential(pipeline))?;
        let token = match bearer_token(credential) {
            Some(token) => token,
            None if credential == "Bearer" => {
                return Err(ImportError::missing_credential(pipeline));
            }
            None => return Err(ImportError::malformed_credential(pipeline)),
        };

        let principal = self
            .auth
            .verify(token)
            .await
            .map_err(|err| ImportError::authentication(pipeline, err))?;

        if !principal.is_admin() {
            return Err(ImportError::Forbidden { pipeline });
        }
        Ok(Authorized {
            principal,
            credential: credential.to_string(),
        })
    }

    /// Clear the volume, then delete every record in the storage service.
    ///
    /// The volume is cleared first and the storage service is not contacted
    /// when that fails. A storage failure does not restore the volume.
    pub async fn reset(&self, caller: &Authorized) -> Result<(), ImportError> {
        let start = Instant::now();
        let result = self.run_reset(caller).await;
        telemetry::record_duration(Pipeline::Reset, start.elapsed());
        if let Err(err) = &result {
            report(err);
        }
        result
    }

    async fn run_reset(&self, caller: &Authorized) -> Result<(), ImportError> {
        debug!(stage = ResetStage::ClearingVolume.as_str(), "reset_stage");
        let removed = self.volume.clear().await?;

        debug!(stage = ResetStage::DeletingRecords.as_str(), removed, "reset_stage");
        self.store
            .delete_all(caller.credential())
            .await
            .map_err(ImportError::storage_delete_all)?;

        info!(
            username = %caller.principal.username,
            removed,
            "reset_complete"
        );
        Ok(())
    }

    /// Validate, persist, convert and submit one uploaded image.
    ///
    /// Steps run strictly in order; conversion completes before the record
    /// that references its output is assembled.
    pub async fn upload(
        &self,
        caller: &Authorized,
        asset: UploadedAsset,
    ) -> Result<UploadReceipt, ImportError> {
        let start = Instant::now();
        let result = self.run_upload(caller, asset).await;
        telemetry::record_duration(Pipeline::Upload, start.elapsed());
        if let Err(err) = &result {
            report(err);
        }
        result
    }

    async fn run_upload(
        &self,
        caller: &Authorized,
        asset: UploadedAsset,
    ) -> Result<UploadReceipt, ImportError> {
        debug!(
            stage = UploadStage::ValidatingPayload.as_str(),
            filename = asset.filename(),
            size = asset.len(),
            "upload_stage"
        );
        let ValidatedAsset {
            filename, bytes, ..
        } = ingest::ingest(asset, &self.config.ingest)?;

        let target = self.allocator.allocate(&filename);
        debug!(stage = UploadStage::Persisting.as_str(), path = %target, "upload_stage");
        self.volume.persist(&target, &bytes).await?;
        drop(bytes);
        let path = target.as_string();

        debug!(stage = UploadStage::Converting.as_str(), path = %path, "upload_stage");
        let document = match self.converter.convert(&path).await {
            Ok(document) => document,
            Err(err) => {
                self.discard_orphan(&target).await;
                return Err(ImportError::conversion(err));
            }
        };

        debug!(stage = UploadStage::AssemblingRecord.as_str(), path = %path, "upload_stage");
        let record = ImportRecord::new(document, path.clone(), filename);

        debug!(stage = UploadStage::Submitting.as_str(), path = %path, "upload_stage");
        if let Err(err) = self
            .store
            .insert(std::slice::from_ref(&record), caller.credential())
            .await
        {
            // An unreadable reply means the record was already accepted.
            if !matches!(err, UpstreamError::ReadBody { .. }) {
                self.discard_orphan(&target).await;
            }
            return Err(ImportError::storage_insert(err));
        }

        info!(
            stamp = target.stamp(),
            path = %path,
            filename = %record.filename,
            "upload_complete"
        );
        Ok(UploadReceipt {
            stamp: target.stamp(),
            path: target,
        })
    }

    async fn discard_orphan(&self, target: &StoredFilePath) {
        if !self.config.remove_orphans_on_failure {
            return;
        }
        if self.volume.remove(target).await {
            info!(path = %target, "orphan_removed");
        }
    }
}

/// Log and count a terminal failure.
///
/// The pipelines call this themselves; callers raising an [`ImportError`]
/// outside them (multipart parsing, a failed task) call it directly.
pub fn report(err: &ImportError) {
    telemetry::record_failure(err);
    let pipeline = err.pipeline().as_str();
    let stage = err.stage().map_or("task", |s| s.as_str());
    let status = err.status().as_u16();
    let detail = err.detail().unwrap_or_default();
    if err.is_client_error() {
        warn!(pipeline, stage, status, error = %err, detail, "import_rejected");
    } else {
        error!(pipeline, stage, status, error = %err, detail, "import_failed");
    }
}
