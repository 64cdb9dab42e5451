pub mod commands;
pub mod prompt;

use anyhow::Result;
use clap::{Args, ValueEnum};
use rbyte_app_core::{ClientSettings, SettingsRepo};
use rbyte_core::{FormFields, LeadKind};

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum CliLeadKind {
    Registrations,
    Enrollments,
    Masterclass,
}

impl From<CliLeadKind> for LeadKind {
    fn from(k: CliLeadKind) -> Self {
        match k {
            CliLeadKind::Registrations => LeadKind::Registrations,
            CliLeadKind::Enrollments => LeadKind::Enrollments,
            CliLeadKind::Masterclass => LeadKind::MasterclassRegistrations,
        }
    }
}

/// Form values that can be given up front. Anything a flow requires but is
/// missing here gets asked for interactively.
#[derive(Args, Clone, Debug, Default)]
pub struct FormArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long, help = "Dial code, e.g. +91")]
    pub country_code: Option<String>,
    #[arg(long)]
    pub current_role: Option<String>,
    #[arg(long, help = "Years of professional experience")]
    pub experience: Option<String>,
    #[arg(long)]
    pub programming_experience: Option<String>,
    #[arg(long)]
    pub goals: Option<String>,
    #[arg(long)]
    pub heard_from: Option<String>,
    #[arg(long, help = "weekday or weekend")]
    pub preferred_batch: Option<String>,
}

impl FormArgs {
    pub fn into_fields(self, default_country_code: &str) -> FormFields {
        FormFields {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            country_code: self
                .country_code
                .unwrap_or_else(|| default_country_code.to_string()),
            current_role: self.current_role.unwrap_or_default(),
            experience: self.experience.unwrap_or_default(),
            programming_experience: self.programming_experience.unwrap_or_default(),
            goals: self.goals.unwrap_or_default(),
            heard_from: self.heard_from.unwrap_or_default(),
            preferred_batch: self.preferred_batch.unwrap_or_default(),
        }
    }
}

/// Built-in defaults, then the settings file, then `--api-base` / `RBYTE_API_BASE`.
pub fn resolve_settings(
    repo: &impl SettingsRepo,
    api_base: Option<String>,
) -> Result<ClientSettings> {
    let mut settings = repo.load()?;
    if let Some(url) = api_base {
        settings.set("api_base_url", &url)?;
    }
    Ok(settings)
}
