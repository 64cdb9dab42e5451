use async_trait::async_trait;
use rbyte_core::{
    AllLeads, Enrollment, FormFields, GatedAction, LeadKind, MasterclassRegistration, Paginated,
    Registration,
};

/// A backend failure, already phrased for the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait LeadsBackend: Send + Sync + 'static {
    async fn send_otp(&self, phone: &str, country_code: &str) -> Result<(), BackendError>;

    async fn verify_otp(
        &self,
        phone: &str,
        otp: &str,
        country_code: &str,
    ) -> Result<(), BackendError>;

    /// The business call a verified phone number unlocks.
    async fn perform(&self, action: &GatedAction, fields: &FormFields)
        -> Result<(), BackendError>;
}

/// One page of whichever lead list a dashboard tab shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadPage {
    Registrations(Paginated<Registration>),
    Enrollments(Paginated<Enrollment>),
    MasterclassRegistrations(Paginated<MasterclassRegistration>),
}

macro_rules! page_meta {
    ($self:ident, $field:ident) => {
        match $self {
            LeadPage::Registrations(p) => p.$field,
            LeadPage::Enrollments(p) => p.$field,
            LeadPage::MasterclassRegistrations(p) => p.$field,
        }
    };
}

impl LeadPage {
    pub fn kind(&self) -> LeadKind {
        match self {
            LeadPage::Registrations(_) => LeadKind::Registrations,
            LeadPage::Enrollments(_) => LeadKind::Enrollments,
            LeadPage::MasterclassRegistrations(_) => LeadKind::MasterclassRegistrations,
        }
    }

    pub fn page(&self) -> u32 {
        page_meta!(self, page)
    }

    pub fn total_pages(&self) -> u32 {
        page_meta!(self, total_pages)
    }

    pub fn total(&self) -> u64 {
        page_meta!(self, total)
    }

    pub fn len(&self) -> usize {
        match self {
            LeadPage::Registrations(p) => p.items.len(),
            LeadPage::Enrollments(p) => p.items.len(),
            LeadPage::MasterclassRegistrations(p) => p.items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
pub trait LeadsAdmin: Send + Sync + 'static {
    async fn all_leads(&self) -> Result<AllLeads, BackendError>;

    async fn list(
        &self,
        kind: LeadKind,
        page: u32,
        page_size: u32,
    ) -> Result<LeadPage, BackendError>;
}

pub trait SettingsRepo: Send + Sync + 'static {
    fn load(&self) -> anyhow::Result<crate::domain::ClientSettings>;
    fn save(&self, settings: &crate::domain::ClientSettings) -> anyhow::Result<()>;
}
