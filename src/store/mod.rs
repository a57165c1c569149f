pub mod model;
pub mod speaker;

use serde_json::Value;

use crate::api::{reject_unsuccessful, routes, server_message, TtsApi};

pub use model::ModelDescriptor;
pub use speaker::{Speaker, SpeakerDescriptor, SpeakerResolution};

/// Cached speaker and model lists plus a shared loading/error pair.
///
/// Only the fetch actions write the lists. Views read them.
#[derive(Debug, Default)]
pub struct CatalogStore {
    speakers: Vec<SpeakerDescriptor>,
    models: Vec<ModelDescriptor>,
    loading: bool,
    error: Option<String>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speakers(&self) -> &[SpeakerDescriptor] {
        &self.speakers
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub async fn fetch_speakers<A: TtsApi>(&mut self, api: &A) {
        self.loading = true;
        self.error = None;
        let outcome = api.list_speakers().await;
        self.loading = false;

        let url = routes::endpoint(api.base_url(), routes::SPEAKERS);
        let parsed = match outcome {
            Ok(payload) => reject_unsuccessful(&payload, &url)
                .map(|_| speakers_from_payload(&payload))
                .map_err(|e| e.user_message()),
            Err(e) => Err(e.user_message()),
        };

        match parsed {
            Ok(speakers) => {
                tracing::info!("Loaded {} speakers", speakers.len());
                self.speakers = speakers;
            }
            Err(msg) => {
                tracing::error!("Failed to fetch speakers: {}", msg);
                self.speakers = Vec::new();
                self.error = Some(format!("Failed to load speakers: {}", msg));
            }
        }
    }

    pub async fn fetch_models<A: TtsApi>(&mut self, api: &A) {
        self.loading = true;
        self.error = None;
        let outcome = api.list_models().await;
        self.loading = false;

        let parsed = match outcome {
            Ok(payload) => models_from_payload(&payload),
            Err(e) => Err(e.user_message()),
        };

        match parsed {
            Ok(models) => {
                tracing::info!("Loaded {} models", models.len());
                self.models = models;
            }
            Err(msg) => {
                tracing::error!("Failed to fetch models: {}", msg);
                self.models = Vec::new();
                self.error = Some(format!("Failed to load models: {}", msg));
            }
        }
    }

    /// Both lists, speakers first. A speaker failure stays visible even when
    /// the model fetch succeeds.
    pub async fn fetch_all<A: TtsApi>(&mut self, api: &A) {
        self.fetch_speakers(api).await;
        let speaker_error = self.error.take();
        self.fetch_models(api).await;
        if let Some(err) = speaker_error {
            self.error = Some(match self.error.take() {
                Some(model_err) => format!("{}; {}", err, model_err),
                None => err,
            });
        }
    }

    /// Finds a loaded speaker by label or by internal id.
    pub fn find_speaker(&self, label_or_id: &str) -> Option<&SpeakerDescriptor> {
        let needle = label_or_id.trim();
        self.speakers
            .iter()
            .find(|s| s.desc == needle || s.name == needle)
    }

    /// Finds a loaded model by value or label.
    pub fn find_model(&self, value_or_label: &str) -> Option<&ModelDescriptor> {
        let needle = value_or_label.trim();
        self.models
            .iter()
            .find(|m| m.value == needle || m.label == needle)
    }
}

/// Interprets a speaker listing of any of the shapes the backend has used.
pub fn speakers_from_payload(payload: &Value) -> Vec<SpeakerDescriptor> {
    let entries: Vec<&Value> = match payload {
        Value::Array(items) => items.iter().collect(),
        other => match other
            .pointer("/data/speakers")
            .or_else(|| other.get("speakers"))
        {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![other],
        },
    };

    let mut speakers: Vec<SpeakerDescriptor> = Vec::new();
    for entry in entries {
        match resolve_entry(entry).speaker() {
            Some(speaker) => {
                let descriptor = speaker.descriptor();
                if !speakers.contains(&descriptor) {
                    speakers.push(descriptor);
                }
            }
            None => tracing::warn!("Dropping speaker with no known label: {}", entry),
        }
    }
    speakers
}

fn resolve_entry(entry: &Value) -> SpeakerResolution {
    match entry {
        Value::String(label) => Speaker::resolve(label),
        Value::Object(map) => {
            let label = map
                .get("desc")
                .or_else(|| map.get("label"))
                .and_then(Value::as_str);
            let by_label = label.map_or(SpeakerResolution::Unresolved, Speaker::resolve);
            by_label.or_else(|| {
                map.get("name")
                    .and_then(Value::as_str)
                    .map_or(SpeakerResolution::Unresolved, Speaker::from_id)
            })
        }
        _ => SpeakerResolution::Unresolved,
    }
}

/// `Err` carries the message to record. An empty list becomes the single
/// default model.
pub fn models_from_payload(payload: &Value) -> Result<Vec<ModelDescriptor>, String> {
    if payload.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(server_message(payload).unwrap_or_else(|| "server reported failure".to_string()));
    }

    let entries = match payload
        .get("models")
        .or_else(|| payload.pointer("/data/models"))
    {
        Some(Value::Array(items)) => items,
        _ => return Err("response contains no model list".to_string()),
    };

    let models: Vec<ModelDescriptor> = entries.iter().filter_map(ModelDescriptor::from_entry).collect();
    if models.is_empty() {
        tracing::warn!("Server returned no models, using the default model");
        return Ok(vec![ModelDescriptor::default_model()]);
    }
    Ok(models)
}
