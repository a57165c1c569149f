use reqwest::multipart::{Form, Part};
use reqwest::{header, Response};
use serde_json::Value;

use super::routes;
use super::{
    reject_unsuccessful, server_message, CloneRequest, ClonedAudio, GenerationRequest,
    GenerationResult, SampleFile, ServiceInfo, TtsApi, UploadedSample,
};
use crate::config::ClientConfig;
use crate::error::ClientError;

/// `TtsApi` over HTTP. One call per method, no retries.
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The underlying client, shared with audio download and preload.
    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        routes::endpoint(&self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        read_json(response).await
    }

    async fn post_json<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<Value, ClientError> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        read_json(response).await
    }
}

/// Splits a response into a JSON body or a backend error. Non-2xx statuses
/// keep whatever message the server sent.
async fn read_json(response: Response) -> Result<Value, ClientError> {
    let url = response.url().to_string();
    let status = response.status();
    let text = response.text().await.map_err(ClientError::from_reqwest)?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| server_message(&body));
        tracing::warn!("{} returned {}", url, status);
        return Err(ClientError::Backend {
            status: Some(status.as_u16()),
            message,
            url,
        });
    }

    serde_json::from_str(&text).map_err(|e| ClientError::Malformed {
        url,
        reason: format!("invalid JSON: {}", e),
    })
}

fn required_str<'a>(body: &'a Value, pointer: &str, url: &str) -> Result<&'a str, ClientError> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ClientError::Malformed {
            url: url.to_string(),
            reason: format!("missing '{}'", pointer.trim_start_matches('/').replace('/', ".")),
        })
}

impl TtsApi for HttpApi {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_speakers(&self) -> Result<Value, ClientError> {
        self.get_json(routes::SPEAKERS).await
    }

    async fn list_models(&self) -> Result<Value, ClientError> {
        self.get_json(routes::MODELS).await
    }

    async fn generate_speech(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ClientError> {
        tracing::info!(
            text_len = request.text.chars().count(),
            speaker = %request.speaker,
            model = %request.model,
            "Requesting speech generation"
        );
        let url = self.url(routes::GENERATE);
        let body = self.post_json(routes::GENERATE, request).await?;
        reject_unsuccessful(&body, &url)?;

        let audio_path = required_str(&body, "/data/audio_url", &url)?;
        let file_name = body
            .pointer("/data/file_name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| file_name_from_path(audio_path));

        Ok(GenerationResult {
            audio_url: routes::tts_audio_url(&self.base_url, audio_path),
            file_name,
        })
    }

    async fn upload_sample(&self, sample: &SampleFile) -> Result<UploadedSample, ClientError> {
        let url = self.url(routes::UPLOAD_SAMPLE);
        tracing::info!(file = %sample.file_name, bytes = sample.bytes.len(), "Uploading voice sample");

        let part = Part::bytes(sample.bytes.clone())
            .file_name(sample.file_name.clone())
            .mime_str(sample.mime)
            .map_err(ClientError::from_reqwest)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;
        let body = read_json(response).await?;
        reject_unsuccessful(&body, &url)?;

        Ok(UploadedSample {
            file_path: required_str(&body, "/file_path", &url)?.to_string(),
        })
    }

    async fn clone_voice(&self, request: &CloneRequest) -> Result<ClonedAudio, ClientError> {
        tracing::info!(sample = %request.speaker_wav, "Requesting voice clone");
        let url = self.url(routes::CLONE);
        let body = self.post_json(routes::CLONE, request).await?;
        reject_unsuccessful(&body, &url)?;

        let file_path = required_str(&body, "/file_path", &url)?.to_string();
        Ok(ClonedAudio {
            audio_url: routes::clone_audio_url(&self.base_url, &file_path),
            file_path,
        })
    }

    async fn ping(&self) -> Result<ServiceInfo, ClientError> {
        let url = self.url(routes::ROOT);
        let body = self.get_json(routes::ROOT).await?;
        serde_json::from_value(body).map_err(|e| ClientError::Malformed {
            url,
            reason: e.to_string(),
        })
    }
}

pub(crate) fn file_name_from_path(path: &str) -> String {
    let without_query = path.split('?').next().unwrap_or(path);
    let tail = match path.split_once("file_path=") {
        Some((_, value)) => value.split('&').next().unwrap_or(value),
        None => without_query,
    };
    tail.rsplit('/').next().unwrap_or(tail).to_string()
}
