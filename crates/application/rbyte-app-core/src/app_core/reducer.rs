use rbyte_core::Step;

use super::events::FlowEvent;
use crate::domain::FlowState;

pub fn reduce(mut state: FlowState, ev: FlowEvent) -> FlowState {
    match ev {
        FlowEvent::FieldChanged { field, value } => {
            if state.step == Step::Form {
                state.fields.set(field, value);
            }
        }
        FlowEvent::FieldsReplaced(fields) => state.fields = fields,

        FlowEvent::PendingStarted => state.pending = true,
        FlowEvent::PendingCleared { session } => {
            if state.session == session {
                state.pending = false;
            }
        }

        FlowEvent::OtpRequested => {
            state.step = Step::Otp;
            state.otp.clear();
            state.otp_error = None;
            state.focused_otp_index = Some(0);
        }

        FlowEvent::OtpDigitEntered { index, value } => {
            if state.step == Step::Otp {
                // Rejected input leaves the buffer and focus as they were.
                if let Ok(next) = state.otp.enter(index, &value) {
                    state.focused_otp_index = next.or(Some(index));
                }
            }
        }

        FlowEvent::OtpFocusMoved(focus) => {
            if state.step == Step::Otp {
                state.focused_otp_index = focus;
            }
        }

        FlowEvent::OtpPasted { index, text } => {
            if state.step == Step::Otp {
                if let Ok(next) = state.otp.paste(index, &text) {
                    state.focused_otp_index = Some(next);
                }
            }
        }

        FlowEvent::OtpCleared => {
            state.otp.clear();
            state.otp_error = None;
            if state.step == Step::Otp {
                state.focused_otp_index = Some(0);
            }
        }

        FlowEvent::VerificationFailed { message } => {
            state.otp_error = Some(message);
        }

        FlowEvent::Completed => {
            state.step = Step::Success;
            state.otp_error = None;
            state.focused_otp_index = None;
        }

        FlowEvent::PhoneEditRequested => {
            state.step = Step::Form;
            state.otp.clear();
            state.otp_error = None;
            state.focused_otp_index = None;
        }

        FlowEvent::Reset { session } => {
            state = FlowState::default();
            state.session = session;
        }
    }
    state
}
