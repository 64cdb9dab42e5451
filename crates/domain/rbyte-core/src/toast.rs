use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
    Success,
}

/// Opaque handle of a registered toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToastId(uuid::Uuid);

impl ToastId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ToastId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a caller hands to the toast store. Unset fields take the store defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastRequest {
    pub title: String,
    pub description: Option<String>,
    pub variant: Option<ToastVariant>,
    pub duration_ms: Option<u64>,
}

impl ToastRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            variant: None,
            duration_ms: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(title).variant(ToastVariant::Success)
    }

    pub fn destructive(title: impl Into<String>) -> Self {
        Self::new(title).variant(ToastVariant::Destructive)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn variant(mut self, variant: ToastVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastMessage {
    pub id: ToastId,
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
    pub duration_ms: u64,
    pub visible: bool,
}

impl ToastMessage {
    pub fn from_request(id: ToastId, req: ToastRequest) -> Self {
        Self {
            id,
            title: req.title,
            description: req.description,
            variant: req.variant.unwrap_or_default(),
            duration_ms: req
                .duration_ms
                .unwrap_or(rbyte_config::DEFAULT_TOAST_DURATION_MS),
            visible: true,
        }
    }
}
