//! Request bodies sent to the backend and the lead records it returns.

use crate::form::{FormField, FormFields};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOtpRequest {
    pub phone: String,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub otp: String,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterInterestRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heard_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country_code: String,
    pub current_role: String,
    pub experience: String,
    pub programming_experience: String,
    pub goals: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heard_from: Option<String>,
    pub preferred_batch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterclassRegisterRequest {
    pub name: String,
    pub phone: String,
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masterclass_id: Option<String>,
}

fn trimmed(fields: &FormFields, field: FormField) -> String {
    fields.get(field).trim().to_string()
}

impl SendOtpRequest {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            phone: fields.phone_digits(),
            country_code: trimmed(fields, FormField::CountryCode),
        }
    }
}

impl VerifyOtpRequest {
    pub fn from_fields(fields: &FormFields, otp: impl Into<String>) -> Self {
        Self {
            phone: fields.phone_digits(),
            otp: otp.into(),
            country_code: trimmed(fields, FormField::CountryCode),
        }
    }
}

impl RegisterInterestRequest {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            name: trimmed(fields, FormField::Name),
            email: fields.optional(FormField::Email),
            phone: fields.phone_digits(),
            country_code: trimmed(fields, FormField::CountryCode),
            heard_from: fields.optional(FormField::HeardFrom),
        }
    }
}

impl EnrollRequest {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            name: trimmed(fields, FormField::Name),
            email: trimmed(fields, FormField::Email),
            phone: fields.phone_digits(),
            country_code: trimmed(fields, FormField::CountryCode),
            current_role: trimmed(fields, FormField::CurrentRole),
            experience: trimmed(fields, FormField::Experience),
            programming_experience: trimmed(fields, FormField::ProgrammingExperience),
            goals: trimmed(fields, FormField::Goals),
            heard_from: fields.optional(FormField::HeardFrom),
            preferred_batch: trimmed(fields, FormField::PreferredBatch),
        }
    }
}

impl MasterclassRegisterRequest {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            name: trimmed(fields, FormField::Name),
            phone: fields.phone_digits(),
            country_code: trimmed(fields, FormField::CountryCode),
            email: fields.optional(FormField::Email),
            masterclass_id: None,
        }
    }
}

/// Parse a backend timestamp. Naive timestamps are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|n| n.and_utc())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub country_code: String,
    pub heard_from: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country_code: String,
    pub current_role: String,
    pub experience: String,
    pub programming_experience: String,
    pub goals: String,
    pub heard_from: Option<String>,
    pub preferred_batch: String,
    pub created_at: String,
    #[serde(default)]
    pub payment_status: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterclassRegistration {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub country_code: String,
    pub created_at: String,
    #[serde(default)]
    pub attended: bool,
}

macro_rules! impl_created_at {
    ($($ty:ty),*) => {
        $(impl $ty {
            pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
                parse_timestamp(&self.created_at)
            }
        })*
    };
}

impl_created_at!(Registration, Enrollment, MasterclassRegistration);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadCounts {
    pub registrations: u64,
    pub enrollments: u64,
    pub masterclass_registrations: u64,
    pub total_leads: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentLeads {
    #[serde(default)]
    pub registrations: Vec<Registration>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub masterclass_registrations: Vec<MasterclassRegistration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllLeads {
    pub counts: LeadCounts,
    #[serde(default)]
    pub recent_leads: RecentLeads,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadKind {
    Registrations,
    Enrollments,
    MasterclassRegistrations,
}

impl LeadKind {
    pub const ALL: [LeadKind; 3] = [
        LeadKind::Registrations,
        LeadKind::Enrollments,
        LeadKind::MasterclassRegistrations,
    ];

    pub fn path(self) -> &'static str {
        match self {
            LeadKind::Registrations => "registrations",
            LeadKind::Enrollments => "enrollments",
            LeadKind::MasterclassRegistrations => "masterclass-registrations",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LeadKind::Registrations => "Registrations",
            LeadKind::Enrollments => "Enrollments",
            LeadKind::MasterclassRegistrations => "Masterclass Registrations",
        }
    }
}
