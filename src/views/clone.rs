use std::path::Path;

use crate::api::{CloneRequest, ClonedAudio, SampleFile, TtsApi, UploadedSample};
use crate::audio::{AudioInfo, AudioProbe};
use crate::error::{ClientError, ValidationError};

pub const MAX_SAMPLE_BYTES: u64 = 10 * 1024 * 1024;

const ALLOWED_SAMPLE_TYPES: [(&str, &str); 3] = [
    ("wav", "audio/wav"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
];

/// Checks a sample's type and size without touching the network. Returns
/// the MIME type to upload it with.
pub fn validate_sample(file_name: &str, size: u64) -> Result<&'static str, ValidationError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let mime = ALLOWED_SAMPLE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| ValidationError::UnsupportedSampleType {
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                extension.clone()
            },
        })?;

    if size > MAX_SAMPLE_BYTES {
        return Err(ValidationError::SampleTooLarge {
            size_mb: size as f64 / (1024.0 * 1024.0),
            max_mb: MAX_SAMPLE_BYTES / (1024 * 1024),
        });
    }

    Ok(mime)
}

impl SampleFile {
    /// Reads a sample from disk. Type and size are checked before the file
    /// content is read.
    pub async fn load(path: &Path) -> Result<Self, ValidationError> {
        let unreadable = |reason: String| ValidationError::SampleUnreadable {
            path: path.display().to_string(),
            reason,
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| unreadable("not a file name".into()))?
            .to_string();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(unreadable("not a regular file".into()));
        }
        let mime = validate_sample(&file_name, metadata.len())?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| unreadable(e.to_string()))?;

        Ok(Self {
            file_name,
            bytes,
            mime,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClonePhase {
    Idle,
    Validating,
    InvalidInput,
    Uploading,
    Cloning,
    Success,
    Failed,
}

/// Voice clone form: upload a reference sample, then synthesize text in
/// that voice.
#[derive(Debug)]
pub struct CloneView {
    text: String,
    sample: Option<SampleFile>,
    phase: ClonePhase,
    uploaded: Option<UploadedSample>,
    result: Option<ClonedAudio>,
    audio_info: Option<AudioInfo>,
    error: Option<String>,
}

impl Default for CloneView {
    fn default() -> Self {
        Self {
            text: String::new(),
            sample: None,
            phase: ClonePhase::Idle,
            uploaded: None,
            result: None,
            audio_info: None,
            error: None,
        }
    }
}

impl CloneView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.error = None;
    }

    /// Picks a sample file. An invalid pick is reported immediately and
    /// leaves no sample selected.
    pub async fn choose_sample(&mut self, path: &Path) -> Result<(), ClientError> {
        self.error = None;
        match SampleFile::load(path).await {
            Ok(sample) => {
                tracing::debug!(file = %sample.file_name, bytes = sample.bytes.len(), "Sample selected");
                self.sample = Some(sample);
                Ok(())
            }
            Err(invalid) => {
                self.sample = None;
                self.error = Some(invalid.to_string());
                Err(invalid.into())
            }
        }
    }

    pub fn set_sample(&mut self, sample: SampleFile) {
        self.sample = Some(sample);
        self.error = None;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn phase(&self) -> ClonePhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, ClonePhase::Uploading | ClonePhase::Cloning)
    }

    pub fn can_clone(&self) -> bool {
        !self.is_busy()
    }

    pub fn sample(&self) -> Option<&SampleFile> {
        self.sample.as_ref()
    }

    /// Set once phase one succeeds, even if phase two later fails.
    pub fn uploaded(&self) -> Option<&UploadedSample> {
        self.uploaded.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.audio_url.as_str())
    }

    pub fn result(&self) -> Option<&ClonedAudio> {
        self.result.as_ref()
    }

    pub fn audio_info(&self) -> Option<&AudioInfo> {
        self.audio_info.as_ref()
    }

    /// Starts an attempt: clears the previous result and error, validates
    /// text and sample, and moves to `Uploading`.
    pub fn begin(&mut self) -> Result<(SampleFile, String), ClientError> {
        if self.is_busy() {
            return Err(ClientError::Busy);
        }

        self.result = None;
        self.audio_info = None;
        self.uploaded = None;
        self.error = None;
        self.phase = ClonePhase::Validating;

        match self.validate() {
            Ok(ready) => {
                self.phase = ClonePhase::Uploading;
                Ok(ready)
            }
            Err(invalid) => {
                self.phase = ClonePhase::InvalidInput;
                self.error = Some(invalid.to_string());
                Err(invalid.into())
            }
        }
    }

    fn validate(&self) -> Result<(SampleFile, String), ValidationError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        let sample = self.sample.as_ref().ok_or(ValidationError::NoSample)?;
        validate_sample(&sample.file_name, sample.bytes.len() as u64)?;
        Ok((sample.clone(), text.to_string()))
    }

    /// Ends the attempt started by `begin`.
    pub fn finish(
        &mut self,
        outcome: Result<(ClonedAudio, AudioInfo), ClientError>,
    ) -> Result<ClonedAudio, ClientError> {
        match outcome {
            Ok((audio, info)) => {
                tracing::info!(path = %audio.file_path, bytes = info.bytes, "Cloned audio ready");
                self.phase = ClonePhase::Success;
                self.result = Some(audio.clone());
                self.audio_info = Some(info);
                Ok(audio)
            }
            Err(e) => {
                tracing::error!("Voice clone failed: {}", e.user_message());
                self.phase = ClonePhase::Failed;
                self.result = None;
                self.audio_info = None;
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Upload, then clone. Either phase failing ends the attempt with one
    /// error. An uploaded sample is left for the backend to clean up.
    pub async fn clone_voice<A: TtsApi, P: AudioProbe>(
        &mut self,
        api: &A,
        probe: &P,
    ) -> Result<ClonedAudio, ClientError> {
        let (sample, text) = self.begin()?;

        let uploaded = match api.upload_sample(&sample).await {
            Ok(uploaded) => uploaded,
            Err(e) => return self.finish(Err(e)),
        };
        tracing::info!(path = %uploaded.file_path, "Sample uploaded");
        self.uploaded = Some(uploaded.clone());
        self.phase = ClonePhase::Cloning;

        let request = CloneRequest {
            text,
            speaker_wav: uploaded.file_path,
        };
        let outcome = clone_and_preload(api, probe, &request).await;
        if outcome.is_err() {
            tracing::warn!(
                sample = %request.speaker_wav,
                "Clone failed after upload; sample remains on the server"
            );
        }
        self.finish(outcome)
    }
}

async fn clone_and_preload<A: TtsApi, P: AudioProbe>(
    api: &A,
    probe: &P,
    request: &CloneRequest,
) -> Result<(ClonedAudio, AudioInfo), ClientError> {
    let audio = api.clone_voice(request).await?;
    let info = probe.preload(&audio.audio_url).await?;
    Ok((audio, info))
}
