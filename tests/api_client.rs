mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::{spawn_backend, BackendState, Reply};
use tts_studio::api::{CloneRequest, GenerationRequest, HttpApi, SampleFile, TtsApi};
use tts_studio::{ClientConfig, ClientError};

fn api_for(base: &str) -> HttpApi {
    let config = ClientConfig::new(base, Duration::from_secs(5)).unwrap();
    HttpApi::new(&config).unwrap()
}

fn request() -> GenerationRequest {
    GenerationRequest {
        text: "你好".into(),
        speaker: "zh_cn_0".into(),
        model: "tts_models/multilingual/multi-dataset/xtts_v2".into(),
    }
}

#[tokio::test]
async fn generate_builds_playable_url() {
    let (state, base) = spawn_backend().await;
    let api = api_for(&base);

    let result = api.generate_speech(&request()).await.unwrap();
    assert_eq!(result.audio_url, format!("{}/api/v1/tts/audio/a.wav", base));
    assert_eq!(result.file_name, "a.wav");

    let bodies = state.generate_bodies.lock().unwrap().clone();
    assert_eq!(
        bodies,
        vec![json!({
            "text": "你好",
            "speaker": "zh_cn_0",
            "model": "tts_models/multilingual/multi-dataset/xtts_v2"
        })]
    );
}

#[tokio::test]
async fn generate_without_leading_slash_gives_same_url() {
    let (state, base) = spawn_backend().await;
    BackendState::set(
        &state.generate,
        Reply::ok(json!({"success": true, "data": {"audio_url": "audio/a.wav", "file_name": "a.wav"}})),
    );

    let result = api_for(&base).generate_speech(&request()).await.unwrap();
    assert_eq!(result.audio_url, format!("{}/api/v1/tts/audio/a.wav", base));
}

#[tokio::test]
async fn generate_missing_audio_url_is_malformed() {
    let (state, base) = spawn_backend().await;
    BackendState::set(
        &state.generate,
        Reply::ok(json!({"success": true, "data": {"file_name": "a.wav"}})),
    );

    let err = api_for(&base).generate_speech(&request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Malformed { .. }), "got {:?}", err);
}

#[tokio::test]
async fn generate_success_false_uses_server_message() {
    let (state, base) = spawn_backend().await;
    BackendState::set(
        &state.generate,
        Reply::ok(json!({"success": false, "message": "model is still loading"})),
    );

    let err = api_for(&base).generate_speech(&request()).await.unwrap_err();
    assert_eq!(err.to_string(), "model is still loading");
}

#[tokio::test]
async fn non_2xx_keeps_detail_and_status() {
    let (state, base) = spawn_backend().await;
    BackendState::set(
        &state.generate,
        Reply::status(StatusCode::BAD_REQUEST, json!({"detail": "invalid speaker: zz"})),
    );

    let err = api_for(&base).generate_speech(&request()).await.unwrap_err();
    match &err {
        ClientError::Backend { status, message, url } => {
            assert_eq!(*status, Some(400));
            assert_eq!(message.as_deref(), Some("invalid speaker: zz"));
            assert!(url.ends_with("/api/v1/tts/generate"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.user_message().contains("HTTP 400"));
}

#[tokio::test]
async fn server_error_without_body_gets_generic_message() {
    let (state, base) = spawn_backend().await;
    BackendState::set(
        &state.generate,
        Reply::status(StatusCode::INTERNAL_SERVER_ERROR, json!({})),
    );

    let err = api_for(&base).generate_speech(&request()).await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed, please try again");
}

#[tokio::test]
async fn timeout_is_a_network_error() {
    let (state, base) = spawn_backend().await;
    *state.models_delay.lock().unwrap() = Some(Duration::from_secs(2));

    let config = ClientConfig::new(&base, Duration::from_millis(200)).unwrap();
    let api = HttpApi::new(&config).unwrap();
    let err = api.list_models().await.unwrap_err();
    assert!(matches!(err, ClientError::Network { .. }), "got {:?}", err);
    assert!(err.user_message().starts_with("network error"));
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    let base = common::dead_backend().await;
    let err = api_for(&base).list_speakers().await.unwrap_err();
    assert!(matches!(err, ClientError::Network { .. }), "got {:?}", err);
}

#[tokio::test]
async fn upload_sends_multipart_file() {
    let (state, base) = spawn_backend().await;
    let sample = SampleFile {
        file_name: "me.mp3".into(),
        bytes: vec![7u8; 4096],
        mime: "audio/mpeg",
    };

    let uploaded = api_for(&base).upload_sample(&sample).await.unwrap();
    assert_eq!(uploaded.file_path, "temp/me.mp3");

    let uploads = state.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].field, "file");
    assert_eq!(uploads[0].file_name, "me.mp3");
    assert_eq!(uploads[0].content_type, "audio/mpeg");
    assert_eq!(uploads[0].size, 4096);
}

#[tokio::test]
async fn clone_url_is_relative_to_root() {
    let (state, base) = spawn_backend().await;
    let request = CloneRequest {
        text: "hello".into(),
        speaker_wav: "temp/me.mp3".into(),
    };

    let audio = api_for(&base).clone_voice(&request).await.unwrap();
    assert_eq!(audio.audio_url, format!("{}/output/clone/c.wav", base));
    assert_eq!(
        state.clone_bodies.lock().unwrap()[0],
        json!({"text": "hello", "speaker_wav": "temp/me.mp3"})
    );
}

#[tokio::test]
async fn ping_reads_service_info() {
    let (_state, base) = spawn_backend().await;
    let info = api_for(&base).ping().await.unwrap();
    assert_eq!(info.version, "1.0.0");
    assert_eq!(info.docs.as_deref(), Some("/docs"));
}
