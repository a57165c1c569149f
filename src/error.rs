/// Problems caught on the client before anything is sent to the backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please enter the text to synthesize")]
    EmptyText,

    #[error("Text too long ({len} chars, max {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("Please select a speaker")]
    NoSpeaker,

    #[error("Please select a model")]
    NoModel,

    #[error("Please choose a voice sample to upload")]
    NoSample,

    #[error("Unsupported sample type '{extension}' (allowed: wav, mp3, m4a)")]
    UnsupportedSampleType { extension: String },

    #[error("Sample is too large ({size_mb:.2}MB, max {max_mb}MB)")]
    SampleTooLarge { size_mb: f64, max_mb: u64 },

    #[error("Cannot read sample '{path}': {reason}")]
    SampleUnreadable { path: String, reason: String },
}

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("network error: {detail}")]
    Network { detail: String, url: Option<String> },

    #[error("{}", backend_message(.message))]
    Backend {
        status: Option<u16>,
        message: Option<String>,
        url: String,
    },

    #[error("Unexpected response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("Audio failed to load: {reason}")]
    Playback { url: String, reason: String },

    #[error("A request is already in progress")]
    Busy,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn backend_message(message: &Option<String>) -> &str {
    match message.as_deref() {
        Some(msg) if !msg.trim().is_empty() => msg,
        _ => "Request failed, please try again",
    }
}

impl ClientError {
    /// The single line shown to the user: the message plus whatever
    /// technical detail helps diagnose it.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network { url: Some(url), .. } => format!("{} ({})", self, url),
            ClientError::Backend {
                status: Some(status),
                url,
                ..
            } => format!("{} (HTTP {} {})", self, status, url),
            ClientError::Backend { url, .. } => format!("{} ({})", self, url),
            ClientError::Playback { url, .. } => format!("{} ({})", self, url),
            _ => self.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string());
        if err.is_decode() {
            return ClientError::Malformed {
                url: url.unwrap_or_default(),
                reason: err.to_string(),
            };
        }
        if let Some(status) = err.status() {
            return ClientError::Backend {
                status: Some(status.as_u16()),
                message: None,
                url: url.unwrap_or_default(),
            };
        }
        let detail = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "could not connect to server".to_string()
        } else {
            err.to_string()
        };
        ClientError::Network { detail, url }
    }
}
