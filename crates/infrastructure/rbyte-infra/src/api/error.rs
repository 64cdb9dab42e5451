pub const NON_JSON_MESSAGE: &str =
    "Server returned non-JSON response. The API endpoint might be incorrect.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("{} (status {status})", NON_JSON_MESSAGE)]
    NonJson { status: u16, snippet: String },
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Config,
    Transport,
    NonJson,
    Api,
    Decode,
    Io,
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::InvalidUrl(_) | ApiError::Client(_) => ApiErrorKind::Config,
            ApiError::Transport(_) => ApiErrorKind::Transport,
            ApiError::NonJson { .. } => ApiErrorKind::NonJson,
            ApiError::Api { .. } => ApiErrorKind::Api,
            ApiError::Decode(_) => ApiErrorKind::Decode,
            ApiError::Io(_) => ApiErrorKind::Io,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NonJson { status, .. } | ApiError::Api { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Text shown to the user in a toast or next to the OTP boxes.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Api { message, .. } => message.clone(),
            ApiError::NonJson { .. } => NON_JSON_MESSAGE.to_string(),
            ApiError::Transport(_) => "Could not reach the server. Please try again later".into(),
            ApiError::Decode(_) => "Unexpected response from the server".into(),
            other => other.to_string(),
        }
    }
}

/// Pull the most specific message out of an error body: `detail`, then
/// `message`, then `error`. FastAPI validation errors put a list under
/// `detail`; those are flattened to their `msg` entries.
pub(crate) fn extract_message(body: &serde_json::Value, status: u16) -> String {
    for key in ["detail", "message", "error"] {
        match body.get(key) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => return s.clone(),
            Some(serde_json::Value::Array(items)) if !items.is_empty() => {
                let msgs: Vec<String> = items
                    .iter()
                    .map(|item| match item.get("msg").and_then(|m| m.as_str()) {
                        Some(m) => m.to_string(),
                        None => item.to_string(),
                    })
                    .collect();
                return msgs.join("; ");
            }
            Some(v @ serde_json::Value::Object(_)) => return v.to_string(),
            _ => {}
        }
    }
    format!("API error: {status}")
}
