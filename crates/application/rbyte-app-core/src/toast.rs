//! Process-wide notification queue.
//!
//! A [`ToastStore`] is cheap to clone; every clone shares the same list and
//! the same observers. Observers are invoked synchronously after the internal
//! lock is released, so a callback may freely call back into the store.
//! Every change bumps a version, and an observer never receives a list older
//! than one it has already seen.

use rbyte_core::{ToastId, ToastMessage, ToastRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tracing::{debug, warn};

struct Observer {
    id: u64,
    delivered: AtomicU64,
    callback: Box<dyn Fn(&[ToastMessage]) + Send + Sync>,
}

impl Observer {
    fn deliver(&self, version: u64, snapshot: &[ToastMessage]) {
        // a nested or concurrent change may already have shown a newer list
        if self.delivered.fetch_max(version, Ordering::SeqCst) < version {
            (self.callback)(snapshot);
        }
    }
}

#[derive(Default)]
struct Inner {
    toasts: Vec<ToastMessage>,
    version: u64,
    observers: Vec<Arc<Observer>>,
    next_listener_id: u64,
}

impl Inner {
    /// Record a change to `toasts` and capture what observers must be told.
    fn changed(&mut self) -> Notification {
        self.version += 1;
        Notification {
            version: self.version,
            snapshot: self.toasts.clone(),
            observers: self.observers.clone(),
        }
    }
}

struct Notification {
    version: u64,
    snapshot: Vec<ToastMessage>,
    observers: Vec<Arc<Observer>>,
}

impl Notification {
    fn deliver(self) {
        for observer in &self.observers {
            observer.deliver(self.version, &self.snapshot);
        }
    }
}

#[derive(Clone, Default)]
pub struct ToastStore {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for ToastStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap();
        f.debug_struct("ToastStore")
            .field("toasts", &inner.toasts)
            .field("version", &inner.version)
            .field("listeners", &inner.observers.len())
            .finish()
    }
}

impl ToastStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a toast and schedule its auto-dismissal.
    pub fn enqueue(&self, req: ToastRequest) -> ToastId {
        let (msg, notification) = {
            let mut inner = self.inner.lock().unwrap();
            let mut id = ToastId::new();
            while inner.toasts.iter().any(|t| t.id == id) {
                id = ToastId::new();
            }
            let msg = ToastMessage::from_request(id, req);
            inner.toasts.push(msg.clone());
            (msg, inner.changed())
        };

        debug!(id = %msg.id, variant = ?msg.variant, title = %msg.title, "toast");
        notification.deliver();
        self.schedule_dismiss(msg.id, Duration::from_millis(msg.duration_ms));
        msg.id
    }

    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) -> ToastId {
        self.enqueue(ToastRequest::success(title).description(description))
    }

    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) -> ToastId {
        self.enqueue(ToastRequest::destructive(title).description(description))
    }

    pub fn info(&self, title: impl Into<String>, description: impl Into<String>) -> ToastId {
        self.enqueue(ToastRequest::new(title).description(description))
    }

    /// Remove a toast. Returns whether anything was removed; unknown ids are a no-op.
    pub fn dismiss(&self, id: &ToastId) -> bool {
        let notification = {
            let mut inner = self.inner.lock().unwrap();
            let before = inner.toasts.len();
            inner.toasts.retain(|t| t.id != *id);
            (inner.toasts.len() != before).then(|| inner.changed())
        };

        match notification {
            Some(notification) => {
                debug!(%id, "toast dismissed");
                notification.deliver();
                true
            }
            None => false,
        }
    }

    /// Drop every toast. Observers hear about it only if the list was non-empty.
    pub fn clear(&self) {
        let notification = {
            let mut inner = self.inner.lock().unwrap();
            if inner.toasts.is_empty() {
                None
            } else {
                inner.toasts.clear();
                Some(inner.changed())
            }
        };
        if let Some(notification) = notification {
            notification.deliver();
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&[ToastMessage]) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        let delivered = AtomicU64::new(inner.version);
        inner.observers.push(Arc::new(Observer {
            id,
            delivered,
            callback: Box::new(callback),
        }));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn snapshot(&self) -> Vec<ToastMessage> {
        self.inner.lock().unwrap().toasts.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().unwrap().observers.len()
    }

    fn schedule_dismiss(&self, id: ToastId, after: Duration) {
        let weak = Arc::downgrade(&self.inner);
        let timer = async move {
            tokio::time::sleep(after).await;
            if let Some(inner) = weak.upgrade() {
                ToastStore { inner }.dismiss(&id);
            }
        };
        if let Err(e) = crate::async_runtime::spawn_detached(timer) {
            warn!(%id, "toast will not auto-dismiss: {e}");
        }
    }
}

/// Handle returned by [`ToastStore::subscribe`]. Dropping it keeps the
/// observer registered; call [`Subscription::unsubscribe`] to remove it.
#[must_use = "dropping a Subscription does not unsubscribe"]
pub struct Subscription {
    id: u64,
    store: Weak<Mutex<Inner>>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.store.upgrade() {
            inner
                .lock()
                .unwrap()
                .observers
                .retain(|o| o.id != self.id);
        }
    }

    pub fn unsubscribe_on_drop(self) -> SubscriptionGuard {
        SubscriptionGuard(self)
    }
}

pub struct SubscriptionGuard(Subscription);

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.0.unsubscribe();
    }
}
