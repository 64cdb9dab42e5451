//! The form → OTP → success flow shared by every enrollment surface.

use std::future::Future;
use std::sync::{Arc, Mutex};

use rbyte_config::OTP_LENGTH;
use rbyte_core::{
    mask_phone, FlowSpec, FormField, FormFields, OtpInputError, Step, ValidationError,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app_core::{reduce, FlowCommand, FlowEvent, FlowStore};
use crate::domain::{FlowState, SessionId};
use crate::ports::{BackendError, LeadsBackend};
use crate::toast::ToastStore;
use crate::viewmodel::FlowViewModel;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("another request is still in flight")]
    Busy,
    #[error("not available while in the {actual:?} step (needs {expected:?})")]
    WrongStep { expected: Step, actual: Step },
    #[error("enter all {} digits of the code", OTP_LENGTH)]
    IncompleteOtp,
    #[error(transparent)]
    OtpInput(#[from] OtpInputError),
    #[error("{0}")]
    Backend(String),
    #[error("the form was reset while the request was in flight")]
    Cancelled,
}

impl From<BackendError> for FlowError {
    fn from(e: BackendError) -> Self {
        FlowError::Backend(e.message)
    }
}

/// Clears `pending` for its session when the operation ends, however it ends.
struct PendingGuard {
    store: FlowStore,
    session: SessionId,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.store.apply(FlowEvent::PendingCleared {
            session: self.session,
        });
    }
}

pub struct OtpFlow<B> {
    spec: FlowSpec,
    store: FlowStore,
    backend: Arc<B>,
    toasts: ToastStore,
    cancel: Mutex<CancellationToken>,
}

impl<B: LeadsBackend> OtpFlow<B> {
    pub fn new(spec: FlowSpec, backend: B, toasts: ToastStore) -> Self {
        Self::with_state(spec, backend, toasts, FlowState::default())
    }

    pub fn with_state(spec: FlowSpec, backend: B, toasts: ToastStore, state: FlowState) -> Self {
        Self {
            spec,
            store: FlowStore::new(state),
            backend: Arc::new(backend),
            toasts,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn spec(&self) -> &FlowSpec {
        &self.spec
    }

    pub fn store(&self) -> &FlowStore {
        &self.store
    }

    pub fn state(&self) -> FlowState {
        self.store.state()
    }

    pub fn toasts(&self) -> &ToastStore {
        &self.toasts
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn view_model(&self) -> FlowViewModel {
        FlowViewModel::from_state(&self.spec, &self.store.state())
    }

    pub async fn dispatch(&self, cmd: FlowCommand) -> Result<(), FlowError> {
        match cmd {
            FlowCommand::SetField { field, value } => self.set_field(field, value),
            FlowCommand::SubmitForm => self.submit_form().await,
            FlowCommand::EnterOtpDigit { index, value } => self.enter_otp_digit(index, &value),
            FlowCommand::OtpBackspace { index } => self.otp_backspace(index),
            FlowCommand::PasteOtp { index, text } => self.paste_otp(index, &text),
            FlowCommand::VerifyAndSubmit => self.verify_and_submit().await,
            FlowCommand::ResendOtp => self.resend_otp().await,
            FlowCommand::EditPhoneNumber => self.edit_phone_number(),
            FlowCommand::Reset => {
                self.reset();
                Ok(())
            }
            FlowCommand::Close => {
                self.close();
                Ok(())
            }
        }
    }

    // Form step

    pub fn set_field(&self, field: FormField, value: impl Into<String>) -> Result<(), FlowError> {
        let value = value.into();
        self.apply_in(Step::Form, |_| Ok(()), FlowEvent::FieldChanged { field, value })
    }

    /// Replace the whole form, e.g. with values collected up front.
    pub fn prefill(&self, fields: FormFields) -> Result<(), FlowError> {
        self.apply_in(Step::Form, |_| Ok(()), FlowEvent::FieldsReplaced(fields))
    }

    /// Validate the form and ask the backend to text a code to the phone.
    pub async fn submit_form(&self) -> Result<(), FlowError> {
        let spec = &self.spec;
        let begun = self.begin(Step::Form, |s| {
            spec.validate(&s.fields).map_err(FlowError::Validation)
        });
        let (state, _pending, token) = match begun {
            Err(FlowError::Validation(e)) => {
                debug!(action = spec.action.name(), "form rejected: {e}");
                let title = match &e {
                    ValidationError::MissingFields(_) => "Missing information",
                    _ => "Invalid information",
                };
                self.toasts.error(title, e.to_string());
                return Err(e.into());
            }
            other => other?,
        };

        let phone = state.fields.phone_digits();
        let country_code = state.fields.country_code.trim();
        debug!(
            action = spec.action.name(),
            phone = %mask_phone(&phone),
            country_code,
            "requesting OTP"
        );

        match self
            .call(&token, self.backend.send_otp(&phone, country_code))
            .await
        {
            Ok(()) => {
                self.commit(state.session, FlowEvent::OtpRequested)?;
                self.toasts.info(
                    "OTP Sent",
                    format!("A verification code has been sent to {country_code} {phone}"),
                );
                Ok(())
            }
            Err(FlowError::Backend(message)) => {
                self.ensure_current(state.session)?;
                warn!(phone = %mask_phone(&phone), "sending OTP failed: {message}");
                self.toasts.error("Failed to send OTP", message.clone());
                Err(FlowError::Backend(message))
            }
            Err(e) => Err(e),
        }
    }

    // OTP step

    pub fn enter_otp_digit(&self, index: usize, value: &str) -> Result<(), FlowError> {
        self.apply_in(
            Step::Otp,
            |s| {
                s.otp.clone().enter(index, value)?;
                Ok(())
            },
            FlowEvent::OtpDigitEntered {
                index,
                value: value.to_string(),
            },
        )
    }

    pub fn otp_backspace(&self, index: usize) -> Result<(), FlowError> {
        self.store.with_state_mut(|s| {
            expect_step(s, Step::Otp)?;
            if let Some(focus) = s.otp.backspace(index) {
                *s = reduce(s.clone(), FlowEvent::OtpFocusMoved(Some(focus)));
            }
            Ok(())
        })
    }

    pub fn paste_otp(&self, index: usize, text: &str) -> Result<(), FlowError> {
        self.apply_in(
            Step::Otp,
            |s| {
                s.otp.clone().paste(index, text)?;
                Ok(())
            },
            FlowEvent::OtpPasted {
                index,
                text: text.to_string(),
            },
        )
    }

    /// Check the code, then run the gated action. Both must succeed to finish.
    pub async fn verify_and_submit(&self) -> Result<(), FlowError> {
        let (state, _pending, token) = self.begin(Step::Otp, |s| {
            if s.otp.is_complete() {
                Ok(())
            } else {
                Err(FlowError::IncompleteOtp)
            }
        })?;
        let code = state.otp.joined();
        let fields = &state.fields;
        let phone = fields.phone_digits();
        let country_code = fields.country_code.trim();

        let outcome = async {
            self.call(&token, self.backend.verify_otp(&phone, &code, country_code))
                .await?;
            debug!(phone = %mask_phone(&phone), "phone verified");
            self.call(&token, self.backend.perform(&self.spec.action, fields))
                .await
        }
        .await;

        match outcome {
            Ok(()) => {
                self.commit(state.session, FlowEvent::Completed)?;
                info!(action = self.spec.action.name(), "submission complete");
                self.toasts.success(
                    self.spec.success_title.clone(),
                    self.spec.success_toast.clone(),
                );
                Ok(())
            }
            Err(FlowError::Backend(message)) => {
                self.commit(
                    state.session,
                    FlowEvent::VerificationFailed {
                        message: message.clone(),
                    },
                )?;
                warn!(action = self.spec.action.name(), "verification failed: {message}");
                self.toasts.error("Verification failed", message.clone());
                Err(FlowError::Backend(message))
            }
            Err(e) => Err(e),
        }
    }

    /// Clear the boxes and the inline error, then send a fresh code.
    pub async fn resend_otp(&self) -> Result<(), FlowError> {
        let (state, _pending, token) = self.begin(Step::Otp, |_| Ok(()))?;
        self.commit(state.session, FlowEvent::OtpCleared)?;

        let phone = state.fields.phone_digits();
        let country_code = state.fields.country_code.trim();
        debug!(phone = %mask_phone(&phone), "resending OTP");

        match self
            .call(&token, self.backend.send_otp(&phone, country_code))
            .await
        {
            Ok(()) => {
                self.ensure_current(state.session)?;
                self.toasts.info("OTP Resent", "A new code has been sent.");
                Ok(())
            }
            Err(FlowError::Backend(message)) => {
                self.ensure_current(state.session)?;
                warn!(phone = %mask_phone(&phone), "resending OTP failed: {message}");
                self.toasts.error("Failed to resend OTP", message.clone());
                Err(FlowError::Backend(message))
            }
            Err(e) => Err(e),
        }
    }

    /// Back to the form with every field kept; the entered code is dropped.
    pub fn edit_phone_number(&self) -> Result<(), FlowError> {
        self.apply_in(Step::Otp, |_| Ok(()), FlowEvent::PhoneEditRequested)
    }

    // Lifecycle

    /// Abandon whatever is in flight and start over with an empty form.
    pub fn reset(&self) {
        let mut cancel = self.cancel.lock().unwrap();
        cancel.cancel();
        *cancel = CancellationToken::new();
        let session = uuid::Uuid::new_v4();
        self.store.apply(FlowEvent::Reset { session });
        debug!(action = self.spec.action.name(), %session, "flow reset");
    }

    /// The host dismissed the drawer.
    pub fn close(&self) {
        self.reset();
    }

    fn begin(
        &self,
        expected: Step,
        check: impl FnOnce(&FlowState) -> Result<(), FlowError>,
    ) -> Result<(FlowState, PendingGuard, CancellationToken), FlowError> {
        let cancel = self.cancel.lock().unwrap();
        let state = self.store.with_state_mut(|s| {
            if s.pending {
                return Err(FlowError::Busy);
            }
            expect_step(s, expected)?;
            check(s)?;
            *s = reduce(s.clone(), FlowEvent::PendingStarted);
            Ok(s.clone())
        })?;
        let guard = PendingGuard {
            store: self.store.clone(),
            session: state.session,
        };
        Ok((state, guard, cancel.clone()))
    }

    fn apply_in(
        &self,
        expected: Step,
        check: impl FnOnce(&FlowState) -> Result<(), FlowError>,
        ev: FlowEvent,
    ) -> Result<(), FlowError> {
        let otp_input = matches!(
            ev,
            FlowEvent::OtpDigitEntered { .. } | FlowEvent::OtpPasted { .. }
        );
        self.store.with_state_mut(|s| {
            if s.pending && !otp_input {
                return Err(FlowError::Busy);
            }
            expect_step(s, expected)?;
            check(s)?;
            *s = reduce(s.clone(), ev);
            Ok(())
        })
    }

    async fn call<T>(
        &self,
        token: &CancellationToken,
        fut: impl Future<Output = Result<T, BackendError>>,
    ) -> Result<T, FlowError> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(FlowError::Cancelled),
            res = fut => res.map_err(FlowError::from),
        }
    }

    /// Apply `ev` only if no reset happened since `session` began.
    fn commit(&self, session: SessionId, ev: FlowEvent) -> Result<(), FlowError> {
        let applied = self.store.with_state_mut(|s| {
            if s.session != session {
                return false;
            }
            *s = reduce(s.clone(), ev);
            true
        });
        if applied {
            Ok(())
        } else {
            debug!(%session, "discarding response for a stale session");
            Err(FlowError::Cancelled)
        }
    }

    fn ensure_current(&self, session: SessionId) -> Result<(), FlowError> {
        if self.store.state().session == session {
            Ok(())
        } else {
            debug!(%session, "discarding response for a stale session");
            Err(FlowError::Cancelled)
        }
    }
}

fn expect_step(state: &FlowState, expected: Step) -> Result<(), FlowError> {
    if state.step == expected {
        Ok(())
    } else {
        Err(FlowError::WrongStep {
            expected,
            actual: state.step,
        })
    }
}
