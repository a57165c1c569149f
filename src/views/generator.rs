use crate::api::{GenerationRequest, GenerationResult, TtsApi};
use crate::audio::{AudioInfo, AudioProbe};
use crate::error::{ClientError, ValidationError};
use crate::store::{CatalogStore, ModelDescriptor, Speaker, SpeakerDescriptor};

use super::Choices;

/// The backend refuses longer input.
pub const MAX_TEXT_CHARS: usize = 1000;

pub const NO_SPEAKERS: &str = "No speakers available";
pub const NO_MODELS: &str = "No models available";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorPhase {
    Idle,
    Validating,
    InvalidInput,
    Requesting,
    Success,
    Failed,
}

/// Text-to-speech form: text plus speaker/model selection, one generation
/// at a time.
#[derive(Debug)]
pub struct GeneratorView {
    text: String,
    speaker: Option<String>,
    model: Option<String>,
    phase: GeneratorPhase,
    result: Option<GenerationResult>,
    audio_info: Option<AudioInfo>,
    error: Option<String>,
}

impl Default for GeneratorView {
    fn default() -> Self {
        Self {
            text: String::new(),
            speaker: None,
            model: None,
            phase: GeneratorPhase::Idle,
            result: None,
            audio_info: None,
            error: None,
        }
    }
}

impl GeneratorView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads both lists and preselects the first of each when nothing is
    /// selected yet.
    pub async fn mount<A: TtsApi>(&mut self, store: &mut CatalogStore, api: &A) {
        store.fetch_all(api).await;
        if self.speaker.is_none() {
            self.speaker = store.speakers().first().map(|s| s.name.clone());
        }
        if self.model.is_none() {
            self.model = store.models().first().map(|m| m.value.clone());
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.error = None;
    }

    /// Accepts a speaker label or internal id.
    pub fn select_speaker(&mut self, label_or_id: impl Into<String>) {
        self.speaker = Some(label_or_id.into());
        self.error = None;
    }

    pub fn select_model(&mut self, value: impl Into<String>) {
        self.model = Some(value.into());
        self.error = None;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn phase(&self) -> GeneratorPhase {
        self.phase
    }

    pub fn is_generating(&self) -> bool {
        self.phase == GeneratorPhase::Requesting
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Only set while no error is shown.
    pub fn audio_url(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.audio_url.as_str())
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    pub fn audio_info(&self) -> Option<&AudioInfo> {
        self.audio_info.as_ref()
    }

    pub fn speaker_choices<'a>(&self, store: &'a CatalogStore) -> Choices<'a, SpeakerDescriptor> {
        Choices::from_slice(store.speakers(), NO_SPEAKERS)
    }

    pub fn model_choices<'a>(&self, store: &'a CatalogStore) -> Choices<'a, ModelDescriptor> {
        Choices::from_slice(store.models(), NO_MODELS)
    }

    /// Whether the generate button is enabled.
    pub fn can_generate(&self, store: &CatalogStore) -> bool {
        !self.is_generating()
            && self.speaker_choices(store).is_available()
            && self.model_choices(store).is_available()
    }

    /// Starts an attempt: drops the previous audio and error, then validates.
    /// On `Ok` the view is `Requesting` and the request may be sent.
    pub fn begin(&mut self, store: &CatalogStore) -> Result<GenerationRequest, ClientError> {
        if self.is_generating() {
            return Err(ClientError::Busy);
        }

        self.result = None;
        self.audio_info = None;
        self.error = None;
        self.phase = GeneratorPhase::Validating;

        match self.validate(store) {
            Ok(request) => {
                self.phase = GeneratorPhase::Requesting;
                Ok(request)
            }
            Err(invalid) => {
                self.phase = GeneratorPhase::InvalidInput;
                self.error = Some(invalid.to_string());
                Err(invalid.into())
            }
        }
    }

    fn validate(&self, store: &CatalogStore) -> Result<GenerationRequest, ValidationError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        let len = text.chars().count();
        if len > MAX_TEXT_CHARS {
            return Err(ValidationError::TextTooLong {
                len,
                max: MAX_TEXT_CHARS,
            });
        }

        let speaker = self
            .speaker
            .as_deref()
            .and_then(|s| store.find_speaker(s))
            .and_then(|d| Speaker::from_id(&d.name).speaker())
            .ok_or(ValidationError::NoSpeaker)?;

        let model = self
            .model
            .as_deref()
            .and_then(|m| store.find_model(m))
            .ok_or(ValidationError::NoModel)?;

        Ok(GenerationRequest {
            text: text.to_string(),
            speaker: speaker.id().to_string(),
            model: model.value.clone(),
        })
    }

    /// Ends the attempt started by `begin`.
    pub fn finish(
        &mut self,
        outcome: Result<(GenerationResult, AudioInfo), ClientError>,
    ) -> Result<GenerationResult, ClientError> {
        match outcome {
            Ok((result, info)) => {
                tracing::info!(file = %result.file_name, bytes = info.bytes, "Speech ready");
                self.phase = GeneratorPhase::Success;
                self.result = Some(result.clone());
                self.audio_info = Some(info);
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Speech generation failed: {}", e.user_message());
                self.phase = GeneratorPhase::Failed;
                self.result = None;
                self.audio_info = None;
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// One full attempt: validate, request, preload the produced audio.
    pub async fn generate<A: TtsApi, P: AudioProbe>(
        &mut self,
        store: &CatalogStore,
        api: &A,
        probe: &P,
    ) -> Result<GenerationResult, ClientError> {
        let request = self.begin(store)?;
        let outcome = request_audio(api, probe, &request).await;
        self.finish(outcome)
    }
}

async fn request_audio<A: TtsApi, P: AudioProbe>(
    api: &A,
    probe: &P,
    request: &GenerationRequest,
) -> Result<(GenerationResult, AudioInfo), ClientError> {
    let result = api.generate_speech(request).await?;
    let info = probe.preload(&result.audio_url).await?;
    Ok((result, info))
}
