use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_MODEL_VALUE: &str = "default";
pub const DEFAULT_MODEL_LABEL: &str = "default model";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    pub label: String,
    pub value: String,
}

impl ModelDescriptor {
    pub fn default_model() -> Self {
        Self {
            label: DEFAULT_MODEL_LABEL.to_string(),
            value: DEFAULT_MODEL_VALUE.to_string(),
        }
    }

    /// Accepts `"name"` or `{label, value}` (either half may be missing).
    pub fn from_entry(entry: &Value) -> Option<Self> {
        match entry {
            Value::String(name) if !name.trim().is_empty() => Some(Self {
                label: name.clone(),
                value: name.clone(),
            }),
            Value::Object(map) => {
                let value = map
                    .get("value")
                    .or_else(|| map.get("name"))
                    .and_then(Value::as_str)
                    .filter(|v| !v.trim().is_empty())?;
                let label = map
                    .get("label")
                    .and_then(Value::as_str)
                    .filter(|l| !l.trim().is_empty())
                    .unwrap_or(value);
                Some(Self {
                    label: label.to_string(),
                    value: value.to_string(),
                })
            }
            _ => None,
        }
    }
}
