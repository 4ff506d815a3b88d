#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use record::{AnnotationDocument, DataField, ImportRecord, Location, Meta, Principal, Role};
use snippet_import::{Authenticator, Converter, ImportPipeline, PipelineConfig, RecordStore};
use tempfile::TempDir;
use upstream::{Service, UpstreamError};

pub const ADMIN: &str = "Bearer chevreuil";
pub const ANNOTATOR: &str = "Bearer annotator";
pub const POD: &str = "pod-test";

/// Tokens: `chevreuil` is admin, `annotator` is not, `expired` gets 403 and
/// anything else 401.
#[derive(Default)]
pub struct FakeAuth {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Authenticator for FakeAuth {
    async fn verify(&self, token: &str) -> Result<Principal, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match token {
            "chevreuil" => Ok(Principal::new("morpheus", Role::Admin)),
            "annotator" => Ok(Principal::new("neo", Role::Annotator)),
            "expired" => Err(status(Service::Authentication, 403, "Token expired")),
            _ => Err(status(Service::Authentication, 401, "Invalid token")),
        }
    }
}

/// Records requested paths and whether a file existed there at call time.
#[derive(Default)]
pub struct FakeConverter {
    pub requests: Mutex<Vec<(String, bool)>>,
    pub failure: Option<UpstreamError>,
}

impl FakeConverter {
    pub fn failing(err: UpstreamError) -> Self {
        Self {
            failure: Some(err),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Converter for FakeConverter {
    async fn convert(&self, path: &str) -> Result<AnnotationDocument, UpstreamError> {
        let exists = Path::new(path).is_file();
        self.requests.lock().unwrap().push((path.to_string(), exists));
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(fixed_document()),
        }
    }
}

/// Captures inserts and delete-all calls. When `watch` is set, records
/// whether that directory was empty at the moment delete-all arrived.
#[derive(Default)]
pub struct FakeStore {
    pub inserted: Mutex<Vec<(ImportRecord, String)>>,
    pub deletes: Mutex<Vec<String>>,
    pub volume_empty_at_delete: Mutex<Option<bool>>,
    pub watch: Option<PathBuf>,
    pub insert_failure: Option<UpstreamError>,
    pub delete_failure: Option<UpstreamError>,
}

impl FakeStore {
    pub fn insert_calls(&self) -> usize {
        self.inserted.lock().unwrap().len()
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn insert(
        &self,
        records: &[ImportRecord],
        credential: &str,
    ) -> Result<(), UpstreamError> {
        let mut inserted = self.inserted.lock().unwrap();
        for record in records {
            inserted.push((record.clone(), credential.to_string()));
        }
        match &self.insert_failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn delete_all(&self, credential: &str) -> Result<(), UpstreamError> {
        self.deletes.lock().unwrap().push(credential.to_string());
        if let Some(dir) = &self.watch {
            let empty = std::fs::read_dir(dir).unwrap().next().is_none();
            *self.volume_empty_at_delete.lock().unwrap() = Some(empty);
        }
        match &self.delete_failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub pipeline: ImportPipeline,
    pub auth: Arc<FakeAuth>,
    pub converter: Arc<FakeConverter>,
    pub store: Arc<FakeStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(|cfg| cfg, FakeConverter::default(), FakeStore::default())
    }

    pub fn build(
        configure: impl FnOnce(PipelineConfig) -> PipelineConfig,
        converter: FakeConverter,
        mut store: FakeStore,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        store.watch = Some(dir.path().to_path_buf());
        let auth = Arc::new(FakeAuth::default());
        let converter = Arc::new(converter);
        let store = Arc::new(store);
        let pipeline = ImportPipeline::new(
            configure(PipelineConfig::new(dir.path(), POD)),
            auth.clone(),
            converter.clone(),
            store.clone(),
        )
        .unwrap();
        Self {
            dir,
            pipeline,
            auth,
            converter,
            store,
        }
    }

    pub fn stored_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<_> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        files
    }
}

pub fn status(service: Service, status: u16, body: &str) -> UpstreamError {
    UpstreamError::Status {
        service,
        status,
        body: body.into(),
    }
}

pub fn fixed_document() -> AnnotationDocument {
    AnnotationDocument {
        meta: Meta {
            kind: "line".into(),
            url: String::new(),
        },
        location: vec![Location {
            kind: "line".into(),
            polygon: vec![[0, 0], [8, 0], [8, 8], [0, 8]],
            id: "loc_0".into(),
        }],
        data: vec![DataField {
            kind: "line".into(),
            location_id: "loc_0".into(),
            value: String::new(),
            id: "0".into(),
        }],
        children: None,
        parent: 0,
    }
}

pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 30, 30]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn jpeg_bytes() -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    bytes.resize(64, 0);
    bytes
}
