use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Email,
    Phone,
    CountryCode,
    CurrentRole,
    Experience,
    ProgrammingExperience,
    Goals,
    HeardFrom,
    PreferredBatch,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        FormField::Name,
        FormField::Email,
        FormField::Phone,
        FormField::CountryCode,
        FormField::CurrentRole,
        FormField::Experience,
        FormField::ProgrammingExperience,
        FormField::Goals,
        FormField::HeardFrom,
        FormField::PreferredBatch,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Full Name",
            FormField::Email => "Email Address",
            FormField::Phone => "Phone Number",
            FormField::CountryCode => "Country Code",
            FormField::CurrentRole => "Current Role",
            FormField::Experience => "Years of Professional Experience",
            FormField::ProgrammingExperience => "Programming Experience",
            FormField::Goals => "Goals",
            FormField::HeardFrom => "How did you hear about us?",
            FormField::PreferredBatch => "Preferred Batch",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::CountryCode => "country_code",
            FormField::CurrentRole => "current_role",
            FormField::Experience => "experience",
            FormField::ProgrammingExperience => "programming_experience",
            FormField::Goals => "goals",
            FormField::HeardFrom => "heard_from",
            FormField::PreferredBatch => "preferred_batch",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    /// Accepts both the wire (snake_case) and the form (camelCase) spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(|c| c.to_lowercase())
            .collect();
        FormField::ALL
            .into_iter()
            .find(|f| f.key().replace('_', "") == normalized)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Everything a lead form can collect. Not every flow uses every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub country_code: String,
    pub current_role: String,
    pub experience: String,
    pub programming_experience: String,
    pub goals: String,
    pub heard_from: String,
    pub preferred_batch: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            country_code: rbyte_config::DEFAULT_COUNTRY_CODE.to_string(),
            current_role: String::new(),
            experience: String::new(),
            programming_experience: String::new(),
            goals: String::new(),
            heard_from: String::new(),
            preferred_batch: String::new(),
        }
    }
}

impl FormFields {
    fn slot(&self, field: FormField) -> &String {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::CountryCode => &self.country_code,
            FormField::CurrentRole => &self.current_role,
            FormField::Experience => &self.experience,
            FormField::ProgrammingExperience => &self.programming_experience,
            FormField::Goals => &self.goals,
            FormField::HeardFrom => &self.heard_from,
            FormField::PreferredBatch => &self.preferred_batch,
        }
    }

    fn slot_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::CountryCode => &mut self.country_code,
            FormField::CurrentRole => &mut self.current_role,
            FormField::Experience => &mut self.experience,
            FormField::ProgrammingExperience => &mut self.programming_experience,
            FormField::Goals => &mut self.goals,
            FormField::HeardFrom => &mut self.heard_from,
            FormField::PreferredBatch => &mut self.preferred_batch,
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        self.slot(field)
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    pub fn is_blank(&self, field: FormField) -> bool {
        self.get(field).trim().is_empty()
    }

    /// Reset every field except `keep` to its default.
    pub fn clear_except(&mut self, keep: &[FormField]) {
        let defaults = FormFields::default();
        for field in FormField::ALL {
            if !keep.contains(&field) {
                self.set(field, defaults.get(field));
            }
        }
    }

    /// Trimmed value, or `None` when blank. Used for optional wire fields.
    pub fn optional(&self, field: FormField) -> Option<String> {
        let v = self.get(field).trim();
        (!v.is_empty()).then(|| v.to_string())
    }

    /// The phone number with spaces and hyphens stripped, as sent on the wire.
    pub fn phone_digits(&self) -> String {
        self.phone.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    pub fn full_phone(&self) -> String {
        format!("{}{}", self.country_code.trim(), self.phone_digits())
    }
}
