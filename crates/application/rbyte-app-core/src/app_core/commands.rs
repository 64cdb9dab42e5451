use rbyte_core::FormField;

/// User intents coming out of the drawer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowCommand {
    // Form step
    SetField { field: FormField, value: String },
    SubmitForm,

    // OTP step
    EnterOtpDigit { index: usize, value: String },
    OtpBackspace { index: usize },
    PasteOtp { index: usize, text: String },
    VerifyAndSubmit,
    ResendOtp,
    EditPhoneNumber,

    // Lifecycle
    Reset,
    Close,
}
