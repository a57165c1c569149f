use crate::api::{ServiceInfo, TtsApi};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::store::model::DEFAULT_MODEL_VALUE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vocoder {
    pub label: &'static str,
    pub value: &'static str,
}

/// Offered as-is; the backend is never asked.
pub const VOCODERS: [Vocoder; 2] = [
    Vocoder {
        label: "HiFi-GAN",
        value: "vocoder_models/en/ljspeech/hifigan_v2",
    },
    Vocoder {
        label: "WaveGrad",
        value: "vocoder_models/universal/libri-tts/wavegrad",
    },
];

pub const SAVED_MESSAGE: &str = "Settings saved";

/// Editable settings form. Nothing here is persisted.
#[derive(Debug, Clone)]
pub struct SettingsView {
    api_url: String,
    default_model: String,
    vocoder: Vocoder,
    status: Option<String>,
}

impl SettingsView {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            api_url: config.api_base_url.clone(),
            default_model: DEFAULT_MODEL_VALUE.to_string(),
            vocoder: VOCODERS[0],
            status: None,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn vocoder(&self) -> Vocoder {
        self.vocoder
    }

    pub fn vocoders(&self) -> &'static [Vocoder] {
        &VOCODERS
    }

    /// Last save acknowledgment or connection test outcome.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_api_url(&mut self, url: impl Into<String>) {
        self.api_url = url.into();
        self.status = None;
    }

    pub fn set_default_model(&mut self, model: impl Into<String>) {
        self.default_model = model.into();
        self.status = None;
    }

    /// Accepts a vocoder label (case-insensitive) or value.
    pub fn select_vocoder(&mut self, label_or_value: &str) -> Result<(), ClientError> {
        let wanted = label_or_value.trim();
        let vocoder = VOCODERS
            .iter()
            .find(|v| v.value == wanted || v.label.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ClientError::Config(format!("Unknown vocoder '{}'", wanted)))?;
        self.vocoder = *vocoder;
        self.status = None;
        Ok(())
    }

    /// Acknowledges the form. No persistence layer exists.
    pub fn save(&mut self) -> &str {
        tracing::info!(
            api_url = %self.api_url,
            model = %self.default_model,
            vocoder = self.vocoder.label,
            "Settings acknowledged"
        );
        self.status.insert(SAVED_MESSAGE.to_string())
    }

    pub async fn test_connection<A: TtsApi>(&mut self, api: &A) -> Result<ServiceInfo, ClientError> {
        match api.ping().await {
            Ok(info) => {
                self.status = Some(format!("Connected: {} (v{})", info.message, info.version));
                Ok(info)
            }
            Err(e) => {
                self.status = Some(format!("Connection failed: {}", e.user_message()));
                Err(e)
            }
        }
    }
}
