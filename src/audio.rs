use std::io::Cursor;
use std::path::Path;

use hound::WavReader;
use reqwest::header;

use crate::error::ClientError;

/// Container formats the backend serves or the browser would play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Mp4,
    Ogg,
    Flac,
    /// Declared `audio/*` by the server but not recognised from its bytes.
    Unknown,
}

impl AudioFormat {
    /// Identifies a payload by its leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"RIFF") {
            Some(AudioFormat::Wav)
        } else if bytes.starts_with(b"ID3") || (bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0) {
            Some(AudioFormat::Mp3)
        } else if bytes.len() >= 8 && &bytes[4..8] == b"ftyp" {
            Some(AudioFormat::Mp4)
        } else if bytes.starts_with(b"OggS") {
            Some(AudioFormat::Ogg)
        } else if bytes.starts_with(b"fLaC") {
            Some(AudioFormat::Flac)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    pub bytes: usize,
    pub format: AudioFormat,
    /// Present when the payload is a WAV file.
    pub wav: Option<WavDetails>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WavDetails {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f32,
}

/// Proves a produced audio URL actually loads before a result is shown.
#[allow(async_fn_in_trait)]
pub trait AudioProbe {
    async fn preload(&self, url: &str) -> Result<AudioInfo, ClientError>;
}

pub struct HttpAudioProbe {
    client: reqwest::Client,
}

impl HttpAudioProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl AudioProbe for HttpAudioProbe {
    async fn preload(&self, url: &str) -> Result<AudioInfo, ClientError> {
        let (_, info) = fetch_audio(&self.client, url).await?;
        Ok(info)
    }
}

/// GETs an audio URL and checks the body is audio. Any failure is a
/// playback error for that URL.
pub async fn fetch_audio(
    client: &reqwest::Client,
    url: &str,
) -> Result<(Vec<u8>, AudioInfo), ClientError> {
    let playback = |reason: String| ClientError::Playback {
        url: url.to_string(),
        reason,
    };

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| playback(ClientError::from_reqwest(e).to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(playback(format!("server answered {}", status)));
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| playback(ClientError::from_reqwest(e).to_string()))?
        .to_vec();

    let info = inspect(url, content_type.as_deref(), &bytes)?;
    Ok((bytes, info))
}

/// Checks that a payload is playable audio. An `audio/*` content type is
/// trusted; a missing or octet-stream one needs recognisable magic bytes;
/// anything else is rejected.
pub fn inspect(url: &str, content_type: Option<&str>, bytes: &[u8]) -> Result<AudioInfo, ClientError> {
    let playback = |reason: String| ClientError::Playback {
        url: url.to_string(),
        reason,
    };

    if bytes.is_empty() {
        return Err(playback("empty audio file".into()));
    }

    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty());
    let sniffed = AudioFormat::sniff(bytes);

    let format = match mime.as_deref() {
        Some(m) if m.starts_with("audio/") => sniffed.unwrap_or(AudioFormat::Unknown),
        None | Some("application/octet-stream") | Some("binary/octet-stream") => {
            sniffed.ok_or_else(|| playback("unrecognised audio data".into()))?
        }
        Some(other) => return Err(playback(format!("not audio (content-type {})", other))),
    };

    let wav = if format == AudioFormat::Wav {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| playback(format!("invalid WAV data: {}", e)))?;
        let spec = reader.spec();
        let frames = reader.duration();
        Some(WavDetails {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            duration_secs: frames as f32 / spec.sample_rate.max(1) as f32,
        })
    } else {
        None
    };

    Ok(AudioInfo {
        bytes: bytes.len(),
        format,
        wav,
    })
}

/// Downloads an audio URL to `path`, returning the byte count. Non-audio
/// bodies are refused before anything is written.
pub async fn download(client: &reqwest::Client, url: &str, path: &Path) -> Result<usize, ClientError> {
    let (bytes, _) = fetch_audio(client, url).await?;
    tokio::fs::write(path, &bytes).await?;
    tracing::info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len())
}

/// Plays audio on the default output device, blocking until it ends.
#[cfg(feature = "audio-playback")]
pub fn play(url: &str, bytes: Vec<u8>) -> Result<(), ClientError> {
    let playback = |reason: String| ClientError::Playback {
        url: url.to_string(),
        reason,
    };

    let source = rodio::Decoder::new(Cursor::new(bytes)).map_err(|e| playback(e.to_string()))?;
    let (_stream, stream_handle) =
        rodio::OutputStream::try_default().map_err(|e| playback(e.to_string()))?;
    let sink = rodio::Sink::try_new(&stream_handle).map_err(|e| playback(e.to_string()))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
