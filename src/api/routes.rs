//! Backend routes and the URL arithmetic around them.

pub const TTS_PREFIX: &str = "/api/v1/tts";
pub const SPEAKERS: &str = "/api/v1/tts/speakers";
pub const MODELS: &str = "/api/v1/tts/models";
pub const GENERATE: &str = "/api/v1/tts/generate";
pub const UPLOAD_SAMPLE: &str = "/api/v1/voice-clone/upload-sample";
pub const CLONE: &str = "/api/v1/voice-clone/generate";
pub const ROOT: &str = "/";

pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Turns the server-relative `audio_url` of a generation into a playable URL.
///
/// `/audio/a.wav` and `audio/a.wav` both land under `{base}/api/v1/tts/`.
pub fn tts_audio_url(base: &str, audio_url: &str) -> String {
    if is_absolute(audio_url) {
        return audio_url.to_string();
    }
    format!(
        "{}{}/{}",
        base.trim_end_matches('/'),
        TTS_PREFIX,
        audio_url.trim_start_matches('/')
    )
}

/// Cloned audio is served relative to the backend root.
pub fn clone_audio_url(base: &str, file_path: &str) -> String {
    if is_absolute(file_path) {
        return file_path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        file_path.trim_start_matches('/')
    )
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
