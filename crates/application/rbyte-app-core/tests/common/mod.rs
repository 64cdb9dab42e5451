#![allow(dead_code)]

use async_trait::async_trait;
use rbyte_app_core::{BackendError, LeadsBackend};
use rbyte_core::{FormFields, GatedAction};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// In-memory backend whose answers are queued up front. Calls with nothing
/// queued succeed.
#[derive(Default)]
pub struct ScriptedBackend {
    pub calls: Mutex<Vec<String>>,
    send: Mutex<VecDeque<Result<(), BackendError>>>,
    verify: Mutex<VecDeque<Result<(), BackendError>>>,
    perform: Mutex<VecDeque<Result<(), BackendError>>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_send(self, message: &str) -> Self {
        self.send
            .lock()
            .unwrap()
            .push_back(Err(BackendError::new(message)));
        self
    }

    pub fn fail_verify(self, message: &str) -> Self {
        self.verify
            .lock()
            .unwrap()
            .push_back(Err(BackendError::new(message)));
        self
    }

    pub fn fail_perform(self, message: &str) -> Self {
        self.perform
            .lock()
            .unwrap()
            .push_back(Err(BackendError::new(message)));
        self
    }

    /// Hold every call until the returned `Notify` is signalled.
    pub fn gated(self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(
        &self,
        call: String,
        queue: &Mutex<VecDeque<Result<(), BackendError>>>,
    ) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(call);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        queue.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl LeadsBackend for ScriptedBackend {
    async fn send_otp(&self, phone: &str, country_code: &str) -> Result<(), BackendError> {
        self.answer(format!("send-otp {country_code} {phone}"), &self.send)
            .await
    }

    async fn verify_otp(
        &self,
        phone: &str,
        otp: &str,
        country_code: &str,
    ) -> Result<(), BackendError> {
        self.answer(format!("verify-otp {country_code} {phone} {otp}"), &self.verify)
            .await
    }

    async fn perform(&self, action: &GatedAction, fields: &FormFields) -> Result<(), BackendError> {
        self.answer(format!("{} {}", action.name(), fields.name), &self.perform)
            .await
    }
}

pub fn asha() -> FormFields {
    FormFields {
        name: "Asha".into(),
        phone: "9000000000".into(),
        country_code: "+91".into(),
        ..Default::default()
    }
}

pub fn asha_enrolling() -> FormFields {
    FormFields {
        email: "asha@example.com".into(),
        current_role: "Student".into(),
        experience: "0-1".into(),
        programming_experience: "Beginner".into(),
        goals: "Ship an LLM app".into(),
        preferred_batch: "weekend".into(),
        ..asha()
    }
}
