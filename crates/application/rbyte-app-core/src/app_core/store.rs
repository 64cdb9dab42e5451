use std::sync::{Arc, Mutex};

use crate::domain::FlowState;

use super::{events::FlowEvent, reducer::reduce};

#[derive(Clone, Default)]
pub struct FlowStore {
    inner: Arc<Mutex<FlowState>>,
}

impl FlowStore {
    pub fn new(state: FlowState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> FlowState {
        self.inner.lock().unwrap().clone()
    }

    pub fn apply(&self, ev: FlowEvent) {
        let mut guard = self.inner.lock().unwrap();
        let next = reduce(guard.clone(), ev);
        *guard = next;
    }

    pub(crate) fn with_state_mut<R>(&self, f: impl FnOnce(&mut FlowState) -> R) -> R {
        let mut guard = self.inner.lock().unwrap();
        f(&mut guard)
    }
}
