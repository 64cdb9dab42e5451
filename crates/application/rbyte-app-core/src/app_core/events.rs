use rbyte_core::{FormField, FormFields};

use crate::domain::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    // Form data
    FieldChanged { field: FormField, value: String },
    FieldsReplaced(FormFields),

    // Async bookkeeping
    PendingStarted,
    PendingCleared { session: SessionId },

    // OTP step
    OtpRequested,
    OtpDigitEntered { index: usize, value: String },
    OtpFocusMoved(Option<usize>),
    OtpPasted { index: usize, text: String },
    OtpCleared,
    VerificationFailed { message: String },

    // Transitions
    Completed,
    PhoneEditRequested,
    Reset { session: SessionId },
}
