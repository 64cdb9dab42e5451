pub mod catalog;
pub mod flow;
pub mod form;
pub mod leads;
pub mod otp;
pub mod toast;

pub use catalog::{Catalog, Instructor, Masterclass};
pub use flow::{FlowSpec, FlowSpecBuilder, GatedAction, Step, ValidationError};
pub use form::{FormField, FormFields};
pub use leads::{
    AllLeads, EnrollRequest, Enrollment, LeadCounts, LeadKind, MasterclassRegisterRequest,
    MasterclassRegistration, Paginated, RecentLeads, RegisterInterestRequest, Registration,
    SendOtpRequest, VerifyOtpRequest,
};
pub use otp::{OtpDigits, OtpInputError};
pub use toast::{ToastId, ToastMessage, ToastRequest, ToastVariant};

/// Mask all but the last four digits of a phone number for logs.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let keep = digits.len().min(4);
    let hidden = digits.len() - keep;
    let mut out = "*".repeat(hidden);
    out.extend(&digits[hidden..]);
    out
}

#[cfg(test)]
mod tests {
    use super::mask_phone;

    #[test]
    fn mask_phone_keeps_last_four() {
        assert_eq!(mask_phone("9000001234"), "******1234");
        assert_eq!(mask_phone("12"), "12");
        assert_eq!(mask_phone("98-76 54321"), "*****4321");
    }
}
