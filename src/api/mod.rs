pub mod client;
pub mod routes;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

pub use client::HttpApi;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub text: String,
    pub speaker: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    /// Absolute, playable URL.
    pub audio_url: String,
    pub file_name: String,
}

/// A sample read from disk, ready for multipart upload.
#[derive(Debug, Clone)]
pub struct SampleFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

/// Phase one of a clone: where the backend stored the uploaded sample.
///
/// The backend owns this file's lifetime. Nothing on the client deletes it,
/// including when the second phase fails.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedSample {
    pub file_path: String,
}

/// Phase two of a clone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloneRequest {
    pub text: String,
    pub speaker_wav: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClonedAudio {
    pub file_path: String,
    pub audio_url: String,
}

/// Root endpoint of the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub docs: Option<String>,
}

/// Everything the views and the store need from the backend.
///
/// Speaker and model listings come back raw; interpreting their shape is the
/// store's job.
#[allow(async_fn_in_trait)]
pub trait TtsApi {
    fn base_url(&self) -> &str;

    async fn list_speakers(&self) -> Result<Value, ClientError>;

    async fn list_models(&self) -> Result<Value, ClientError>;

    async fn generate_speech(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ClientError>;

    async fn upload_sample(&self, sample: &SampleFile) -> Result<UploadedSample, ClientError>;

    async fn clone_voice(&self, request: &CloneRequest) -> Result<ClonedAudio, ClientError>;

    async fn ping(&self) -> Result<ServiceInfo, ClientError>;
}

/// The human-readable message a backend put in its body, if any.
///
/// FastAPI reports failures as `{"detail": ...}`, the routers themselves as
/// `{"success": false, "message": ...}`.
pub fn server_message(body: &Value) -> Option<String> {
    if let Some(msg) = body.get("message").and_then(Value::as_str) {
        if !msg.trim().is_empty() {
            return Some(msg.to_string());
        }
    }
    match body.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => Some(detail.clone()),
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}

/// `success: false` in a 2xx body is still a failure.
pub fn reject_unsuccessful(body: &Value, url: &str) -> Result<(), ClientError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ClientError::Backend {
            status: None,
            message: server_message(body),
            url: url.to_string(),
        });
    }
    Ok(())
}
