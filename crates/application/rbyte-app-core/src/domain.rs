use rbyte_core::{FormFields, OtpDigits, Step};
use serde::{Deserialize, Serialize};

pub type SessionId = uuid::Uuid;

/// Everything the enrollment drawer renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowState {
    pub fields: FormFields,
    pub step: Step,
    pub otp: OtpDigits,
    /// Inline error under the OTP boxes.
    pub otp_error: Option<String>,
    pub pending: bool,
    pub focused_otp_index: Option<usize>,
    /// Bumped on reset; responses tagged with an older session are dropped.
    pub session: SessionId,
}

impl Default for FlowState {
    fn default() -> Self {
        Self::with_fields(FormFields::default())
    }
}

impl FlowState {
    pub fn with_fields(fields: FormFields) -> Self {
        Self {
            fields,
            step: Step::Form,
            otp: OtpDigits::new(),
            otp_error: None,
            pending: false,
            focused_otp_index: None,
            session: uuid::Uuid::new_v4(),
        }
    }

    pub fn can_verify(&self) -> bool {
        self.step == Step::Otp && !self.pending && self.otp.is_complete()
    }
}

fn default_api_base_url() -> String {
    rbyte_config::DEFAULT_API_BASE_URL.to_string()
}

fn default_country_code() -> String {
    rbyte_config::DEFAULT_COUNTRY_CODE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    rbyte_config::DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_page_size() -> u32 {
    rbyte_config::DEFAULT_PAGE_SIZE
}

/// Persisted client preferences. Missing keys fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            default_country_code: default_country_code(),
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ClientSettings {
    pub const KEYS: [&'static str; 4] = [
        "api_base_url",
        "default_country_code",
        "request_timeout_secs",
        "page_size",
    ];

    pub fn get(&self, key: &str) -> Result<String, SettingsError> {
        Ok(match key {
            "api_base_url" => self.api_base_url.clone(),
            "default_country_code" => self.default_country_code.clone(),
            "request_timeout_secs" => self.request_timeout_secs.to_string(),
            "page_size" => self.page_size.to_string(),
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        })
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let value = value.trim();
        let invalid = |key: &'static str, reason: &str| SettingsError::InvalidValue {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match key {
            "api_base_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid("api_base_url", "must be an http(s) URL"));
                }
                self.api_base_url = value.to_string();
            }
            "default_country_code" => {
                if !rbyte_config::is_supported_country_code(value) {
                    return Err(invalid(
                        "default_country_code",
                        &format!(
                            "supported codes are {}",
                            rbyte_config::SUPPORTED_COUNTRY_CODES.join(", ")
                        ),
                    ));
                }
                self.default_country_code = value.to_string();
            }
            "request_timeout_secs" => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => return Err(invalid("request_timeout_secs", "must be a positive integer")),
            },
            "page_size" => match value.parse::<u32>() {
                Ok(n) if (1..=rbyte_config::MAX_PAGE_SIZE).contains(&n) => self.page_size = n,
                _ => {
                    return Err(invalid(
                        "page_size",
                        &format!("must be between 1 and {}", rbyte_config::MAX_PAGE_SIZE),
                    ))
                }
            },
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_fill_missing_keys_with_defaults() {
        let s: ClientSettings =
            serde_json::from_str(r#"{"api_base_url": "http://localhost:8000/api"}"#).unwrap();
        assert_eq!(s.api_base_url, "http://localhost:8000/api");
        assert_eq!(s.default_country_code, "+91");
        assert_eq!(s.page_size, rbyte_config::DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn set_validates_values() {
        let mut s = ClientSettings::default();
        s.set("page_size", "25").unwrap();
        assert_eq!(s.get("page_size").unwrap(), "25");

        assert!(matches!(
            s.set("page_size", "0"),
            Err(SettingsError::InvalidValue { key: "page_size", .. })
        ));
        assert!(s.set("default_country_code", "+999").is_err());
        assert!(s.set("api_base_url", "ftp://x").is_err());
        assert_eq!(
            s.set("colour", "blue"),
            Err(SettingsError::UnknownKey("colour".into()))
        );
    }

    #[test]
    fn can_verify_needs_otp_step_and_full_code() {
        let mut state = FlowState::default();
        state.otp = rbyte_core::OtpDigits::from_code("123456").unwrap();
        assert!(!state.can_verify());
        state.step = rbyte_core::Step::Otp;
        assert!(state.can_verify());
        state.pending = true;
        assert!(!state.can_verify());
    }
}
