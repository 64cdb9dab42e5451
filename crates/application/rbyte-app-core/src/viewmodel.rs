use rbyte_config::OTP_LENGTH;
use rbyte_core::{FlowSpec, Step, ToastId, ToastMessage, ToastVariant};

use crate::domain::FlowState;

pub const OTP_STEP_TITLE: &str = "Verify Your Phone Number";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowViewModel {
    pub step: Step,
    pub title: String,
    pub primary_label: String,
    pub primary_enabled: bool,
    pub otp_slots: [String; OTP_LENGTH],
    pub focused_otp_index: Option<usize>,
    /// "Enter the 6-digit code sent to ..." under the OTP title.
    pub otp_hint: Option<String>,
    pub otp_error: Option<String>,
    pub can_resend: bool,
    pub can_edit_phone: bool,
    pub success_heading: Option<String>,
    pub success_message: Option<String>,
    pub offers_curriculum: bool,
}

impl FlowViewModel {
    pub fn from_state(spec: &FlowSpec, state: &FlowState) -> Self {
        let in_otp = state.step == Step::Otp;
        let name = state.fields.name.trim();

        let (title, primary_label) = match state.step {
            Step::Form => (
                spec.title.clone(),
                if state.pending {
                    "Sending OTP...".to_string()
                } else {
                    spec.submit_label.clone()
                },
            ),
            Step::Otp => (
                OTP_STEP_TITLE.to_string(),
                if state.pending {
                    "Verifying...".to_string()
                } else {
                    "Verify & Submit".to_string()
                },
            ),
            Step::Success => (spec.success_title.clone(), "Close".to_string()),
        };

        let primary_enabled = match state.step {
            Step::Form => !state.pending,
            Step::Otp => state.can_verify(),
            Step::Success => true,
        };

        let success = state.step == Step::Success;

        Self {
            step: state.step,
            title,
            primary_label,
            primary_enabled,
            otp_slots: state.otp.as_strings(),
            focused_otp_index: state.focused_otp_index,
            otp_hint: in_otp.then(|| {
                format!(
                    "Enter the {OTP_LENGTH}-digit code sent to {} {}",
                    state.fields.country_code.trim(),
                    state.fields.phone.trim()
                )
            }),
            otp_error: if in_otp { state.otp_error.clone() } else { None },
            can_resend: in_otp && !state.pending,
            can_edit_phone: in_otp && !state.pending,
            success_heading: success.then(|| {
                if name.is_empty() {
                    "Thank you!".to_string()
                } else {
                    format!("Thank you, {name}!")
                }
            }),
            success_message: success.then(|| spec.success_message.clone()),
            offers_curriculum: success && spec.offers_curriculum,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastViewModel {
    pub id: ToastId,
    pub title: String,
    pub description: String,
    pub style: &'static str,
    pub is_error: bool,
}

impl From<&ToastMessage> for ToastViewModel {
    fn from(t: &ToastMessage) -> Self {
        let style = match t.variant {
            ToastVariant::Default => "default",
            ToastVariant::Destructive => "destructive",
            ToastVariant::Success => "success",
        };
        Self {
            id: t.id,
            title: t.title.clone(),
            description: t.description.clone().unwrap_or_default(),
            style,
            is_error: t.variant == ToastVariant::Destructive,
        }
    }
}
