//! In-process stand-in for the XTTS backend, bound to an ephemeral port.
#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use hound::{SampleFormat, WavSpec, WavWriter};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// A canned response: status plus JSON body.
#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn status(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }
}

#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

pub struct BackendState {
    pub speakers: Mutex<Reply>,
    pub models: Mutex<Reply>,
    pub generate: Mutex<Reply>,
    pub clone: Mutex<Reply>,
    /// Delay applied to model listing, for timeout tests.
    pub models_delay: Mutex<Option<Duration>>,
    pub hits: Mutex<Vec<String>>,
    pub generate_bodies: Mutex<Vec<Value>>,
    pub clone_bodies: Mutex<Vec<Value>>,
    pub uploads: Mutex<Vec<UploadRecord>>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            speakers: Mutex::new(Reply::ok(json!({
                "success": true,
                "data": {
                    "speakers": [
                        {"name": "zh_cn_0", "desc": "中文女声（默认）", "language": "zh-cn"},
                        {"name": "en_1", "desc": "英文男声", "language": "en"},
                        {"name": "xx_9", "desc": "未知说话人", "language": "xx"}
                    ]
                },
                "message": "ok"
            }))),
            models: Mutex::new(Reply::ok(json!({
                "success": true,
                "models": ["tts_models/multilingual/multi-dataset/xtts_v2"]
            }))),
            generate: Mutex::new(Reply::ok(json!({
                "success": true,
                "data": {"audio_url": "/audio/a.wav", "file_name": "a.wav"},
                "message": "generated"
            }))),
            clone: Mutex::new(Reply::ok(json!({
                "success": true,
                "file_path": "/output/clone/c.wav",
                "message": "cloned"
            }))),
            models_delay: Mutex::new(None),
            hits: Mutex::new(Vec::new()),
            generate_bodies: Mutex::new(Vec::new()),
            clone_bodies: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }
}

impl BackendState {
    pub fn set(slot: &Mutex<Reply>, reply: Reply) {
        *slot.lock().unwrap() = reply;
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    fn hit(&self, route: &str) {
        self.hits.lock().unwrap().push(route.to_string());
    }
}

/// FastAPI-style error body.
pub enum FakeError {
    NotFound(String),
    BadRequest(String),
}

impl IntoResponse for FakeError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            FakeError::NotFound(d) => (StatusCode::NOT_FOUND, d),
            FakeError::BadRequest(d) => (StatusCode::BAD_REQUEST, d),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

fn reply(r: Reply) -> Response {
    (r.status, Json(r.body)).into_response()
}

async fn root(State(state): State<Arc<BackendState>>) -> Json<Value> {
    state.hit("root");
    Json(json!({
        "message": "Coqui TTS API Service",
        "version": "1.0.0",
        "docs": "/docs"
    }))
}

async fn speakers(State(state): State<Arc<BackendState>>) -> Response {
    state.hit("speakers");
    reply(state.speakers.lock().unwrap().clone())
}

async fn models(State(state): State<Arc<BackendState>>) -> Response {
    state.hit("models");
    let delay = *state.models_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    reply(state.models.lock().unwrap().clone())
}

async fn generate(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.hit("generate");
    state.generate_bodies.lock().unwrap().push(body);
    reply(state.generate.lock().unwrap().clone())
}

async fn upload_sample(
    State(state): State<Arc<BackendState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, FakeError> {
    state.hit("upload");
    let field = multipart
        .next_field()
        .await
        .map_err(|e| FakeError::BadRequest(e.to_string()))?;
    if let Some(field) = field {
        let record = UploadRecord {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().unwrap_or_default().to_string(),
            content_type: field.content_type().unwrap_or_default().to_string(),
            size: 0,
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| FakeError::BadRequest(e.to_string()))?;
        let file_path = format!("temp/{}", record.file_name);
        state.uploads.lock().unwrap().push(UploadRecord {
            size: bytes.len(),
            ..record
        });
        return Ok(Json(json!({
            "success": true,
            "file_path": file_path,
            "message": "uploaded"
        })));
    }
    Err(FakeError::BadRequest("file field required".into()))
}

async fn clone_voice(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.hit("clone");
    state.clone_bodies.lock().unwrap().push(body);
    reply(state.clone.lock().unwrap().clone())
}

async fn audio(
    State(state): State<Arc<BackendState>>,
    Path(name): Path<String>,
) -> Result<Response, FakeError> {
    state.hit("audio");
    if name.starts_with("missing") {
        return Err(FakeError::NotFound(format!("audio file does not exist: {}", name)));
    }
    if name.ends_with(".mp3") {
        let body = b"ID3\x04\x00\x00\x00\x00\x00\x00fake frames".to_vec();
        return Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/octet-stream")], body).into_response());
    }
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "audio/wav")], served_wav()).into_response())
}

/// The WAV every generated or cloned audio route answers with.
pub fn served_wav() -> Vec<u8> {
    samples_to_wav(&[0.0, 0.25, -0.25, 0.5, -0.5], 22050)
}

pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut buffer = Vec::new();
    {
        let mut writer = WavWriter::new(Cursor::new(&mut buffer), spec).unwrap();
        for sample in samples {
            let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer.write_sample(scaled).unwrap();
        }
        writer.finalize().unwrap();
    }
    buffer
}

pub fn create_router(state: Arc<BackendState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let tts_routes = Router::new()
        .route("/speakers", get(speakers))
        .route("/models", get(models))
        .route("/generate", post(generate))
        .route("/audio/:name", get(audio));

    let clone_routes = Router::new()
        .route("/upload-sample", post(upload_sample))
        .route("/generate", post(clone_voice));

    Router::new()
        .route("/", get(root))
        .route("/output/clone/:name", get(audio))
        .nest("/api/v1/tts", tts_routes)
        .nest("/api/v1/voice-clone", clone_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts a fake backend and returns its state and base URL.
pub async fn spawn_backend() -> (Arc<BackendState>, String) {
    let state = Arc::new(BackendState::default());
    let app = create_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake backend");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Fake backend error");
    });

    (state, format!("http://{}", addr))
}

/// A base URL nothing listens on.
pub async fn dead_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Writes `bytes` to `name` inside a fresh temp dir. The file goes away
/// when the returned `TempDir` is dropped.
pub fn temp_file(name: &str, bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    (dir, path)
}
