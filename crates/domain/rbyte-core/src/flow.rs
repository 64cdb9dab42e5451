use crate::form::{FormField, FormFields};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    #[default]
    Form,
    Otp,
    Success,
}

impl Step {
    pub fn is_terminal(self) -> bool {
        matches!(self, Step::Success)
    }
}

/// The business call made once the phone number is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatedAction {
    RegisterInterest,
    Enroll,
    MasterclassRegistration { masterclass_id: Option<String> },
}

impl GatedAction {
    pub fn name(&self) -> &'static str {
        match self {
            GatedAction::RegisterInterest => "register",
            GatedAction::Enroll => "enroll",
            GatedAction::MasterclassRegistration { .. } => "masterclass-register",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields ({})", join_labels(.0))]
    MissingFields(Vec<FormField>),
    #[error("Country code {0} is not supported")]
    UnsupportedCountryCode(String),
    #[error("Please enter a valid phone number")]
    InvalidPhone,
}

fn join_labels(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One instantiation of the OTP-gated form: which action it gates, which
/// fields it needs and what it says to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSpec {
    pub action: GatedAction,
    pub required: Vec<FormField>,
    pub title: String,
    pub submit_label: String,
    pub success_title: String,
    pub success_message: String,
    pub success_toast: String,
    /// Host should offer the curriculum download after success.
    pub offers_curriculum: bool,
}

impl FlowSpec {
    pub fn builder(action: GatedAction) -> FlowSpecBuilder {
        FlowSpecBuilder::new(action)
    }

    pub fn enrollment() -> Self {
        FlowSpec::builder(GatedAction::Enroll)
            .require(FormField::Email)
            .require(FormField::CurrentRole)
            .require(FormField::Experience)
            .require(FormField::ProgrammingExperience)
            .require(FormField::Goals)
            .require(FormField::PreferredBatch)
            .title("Enroll in AI Engineering Course")
            .submit_label("Submit Enrollment")
            .success_title("Enrollment Successful!")
            .success_message(
                "We've received your enrollment request for the AI Engineering Course. \
                 Our team will contact you within 24 hours to confirm your spot and provide payment details.",
            )
            .success_toast("Enrollment submitted.")
            .build()
    }

    pub fn interest() -> Self {
        FlowSpec::builder(GatedAction::RegisterInterest)
            .title("Register Your Interest")
            .submit_label("Continue")
            .success_title("Registration Successful!")
            .success_message(
                "Thank you for registering your interest in our AI Engineering Course. \
                 We'll keep you updated about upcoming batches and send you additional course information.",
            )
            .success_toast("Registration submitted.")
            .build()
    }

    pub fn masterclass(masterclass_id: Option<String>) -> Self {
        FlowSpec::builder(GatedAction::MasterclassRegistration { masterclass_id })
            .title("Register for Masterclass")
            .submit_label("Register Now")
            .success_title("Registration Successful!")
            .success_message("You have successfully registered for the masterclass.")
            .success_toast("You have been registered for the masterclass.")
            .build()
    }

    pub fn syllabus_download() -> Self {
        FlowSpec::builder(GatedAction::RegisterInterest)
            .title("Download the Syllabus")
            .submit_label("Get Syllabus")
            .success_title("Your Syllabus is Ready")
            .success_message("Thanks! Your copy of the curriculum is ready to download.")
            .success_toast("Syllabus unlocked.")
            .offers_curriculum(true)
            .build()
    }

    pub fn requires(&self, field: FormField) -> bool {
        self.required.contains(&field)
    }

    pub fn validate(&self, fields: &FormFields) -> Result<(), ValidationError> {
        let missing: Vec<FormField> = self
            .required
            .iter()
            .copied()
            .filter(|f| fields.is_blank(*f))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let cc = fields.country_code.trim();
        if !rbyte_config::is_supported_country_code(cc) {
            return Err(ValidationError::UnsupportedCountryCode(cc.to_string()));
        }

        let phone = fields.phone.trim();
        let digit_count = phone.chars().filter(|c| c.is_ascii_digit()).count();
        let only_phone_chars = phone
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
        if !only_phone_chars || digit_count < 6 {
            return Err(ValidationError::InvalidPhone);
        }

        Ok(())
    }
}

pub struct FlowSpecBuilder {
    spec: FlowSpec,
}

impl FlowSpecBuilder {
    fn new(action: GatedAction) -> Self {
        Self {
            spec: FlowSpec {
                action,
                required: vec![FormField::Name, FormField::Phone],
                title: "Get Started".into(),
                submit_label: "Continue".into(),
                success_title: "Success!".into(),
                success_message: String::new(),
                success_toast: "Submitted.".into(),
                offers_curriculum: false,
            },
        }
    }

    pub fn require(mut self, field: FormField) -> Self {
        if !self.spec.required.contains(&field) {
            self.spec.required.push(field);
        }
        self
    }

    pub fn title(mut self, v: impl Into<String>) -> Self {
        self.spec.title = v.into();
        self
    }

    pub fn submit_label(mut self, v: impl Into<String>) -> Self {
        self.spec.submit_label = v.into();
        self
    }

    pub fn success_title(mut self, v: impl Into<String>) -> Self {
        self.spec.success_title = v.into();
        self
    }

    pub fn success_message(mut self, v: impl Into<String>) -> Self {
        self.spec.success_message = v.into();
        self
    }

    pub fn success_toast(mut self, v: impl Into<String>) -> Self {
        self.spec.success_toast = v.into();
        self
    }

    pub fn offers_curriculum(mut self, v: bool) -> Self {
        self.spec.offers_curriculum = v;
        self
    }

    pub fn build(self) -> FlowSpec {
        self.spec
    }
}
