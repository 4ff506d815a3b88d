#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use record::{AnnotationDocument, ImportRecord, Location, Meta, Principal, Role};
use server::{build_router, ServerConfig, ServerState};
use snippet_import::{Authenticator, Converter, ImportPipeline, RecordStore};
use tempfile::TempDir;
use upstream::{Service, UpstreamError};

pub const ADMIN: &str = "Bearer chevreuil";
pub const ANNOTATOR: &str = "Bearer annotator";
pub const BOUNDARY: &str = "snippet-import-boundary";

#[derive(Default)]
pub struct Fakes {
    pub auth_calls: AtomicUsize,
    pub conversions: Mutex<Vec<String>>,
    pub inserted: Mutex<Vec<ImportRecord>>,
    pub deletes: AtomicUsize,
    pub delete_status: Option<u16>,
}

pub struct FakeAuth(pub Arc<Fakes>);
pub struct FakeConverter(pub Arc<Fakes>);
pub struct FakeStore(pub Arc<Fakes>);

#[async_trait]
impl Authenticator for FakeAuth {
    async fn verify(&self, token: &str) -> Result<Principal, UpstreamError> {
        self.0.auth_calls.fetch_add(1, Ordering::SeqCst);
        match token {
            "chevreuil" => Ok(Principal::new("morpheus", Role::Admin)),
            "annotator" => Ok(Principal::new("neo", Role::Annotator)),
            _ => Err(UpstreamError::Status {
                service: Service::Authentication,
                status: 401,
                body: "Invalid token".into(),
            }),
        }
    }
}

#[async_trait]
impl Converter for FakeConverter {
    async fn convert(&self, path: &str) -> Result<AnnotationDocument, UpstreamError> {
        self.0.conversions.lock().unwrap().push(path.to_string());
        Ok(document())
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn insert(
        &self,
        records: &[ImportRecord],
        _credential: &str,
    ) -> Result<(), UpstreamError> {
        self.0.inserted.lock().unwrap().extend_from_slice(records);
        Ok(())
    }

    async fn delete_all(&self, _credential: &str) -> Result<(), UpstreamError> {
        self.0.deletes.fetch_add(1, Ordering::SeqCst);
        match self.0.delete_status {
            Some(status) => Err(UpstreamError::Status {
                service: Service::Storage,
                status,
                body: "MongoDB timed out".into(),
            }),
            None => Ok(()),
        }
    }
}

pub struct TestApp {
    pub dir: TempDir,
    pub fakes: Arc<Fakes>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(|_| {}, Fakes::default())
    }

    pub fn with(configure: impl FnOnce(&mut ServerConfig), fakes: Fakes) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServerConfig {
            volume_path: dir.path().display().to_string(),
            pod_name: "pod-test".into(),
            metrics_enabled: false,
            ..Default::default()
        };
        configure(&mut config);

        let fakes = Arc::new(fakes);
        let pipeline = ImportPipeline::new(
            config.pipeline_config(),
            Arc::new(FakeAuth(fakes.clone())),
            Arc::new(FakeConverter(fakes.clone())),
            Arc::new(FakeStore(fakes.clone())),
        )
        .unwrap();
        let router = build_router(Arc::new(ServerState::new(config, pipeline, None)));
        Self { dir, fakes, router }
    }

    pub fn stored_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    pub fn auth_calls(&self) -> usize {
        self.fakes.auth_calls.load(Ordering::SeqCst)
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes: Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// One-part multipart body. `filename: None` sends a plain form value.
pub fn multipart(field: &str, filename: Option<&str>, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
        ),
    }
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(auth: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/import/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn document() -> AnnotationDocument {
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
        ..Default::default()
    }
}

pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([10, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}
