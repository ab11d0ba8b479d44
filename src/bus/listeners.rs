//! Ordered callback registry shared by the event bus and the search channel.
//!
//! Dispatch works on a copy of the registry taken before the first callback
//! runs, so callbacks may subscribe, unsubscribe or publish re-entrantly.
//! A callback removed mid-dispatch is skipped for the rest of that dispatch.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

pub(crate) type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Entry<T> {
    id: u64,
    live: Arc<AtomicBool>,
    callback: Callback<T>,
}

struct Registry<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

pub(crate) struct ListenerSet<T: 'static> {
    label: &'static str,
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> ListenerSet<T> {
    pub(crate) fn new(label: &'static str) -> Self {
        Self {
            label,
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub(crate) fn register(&self, callback: Callback<T>) -> Subscription {
        let live = Arc::new(AtomicBool::new(true));
        let id = {
            let mut registry = self.registry.lock().expect("listener registry mutex poisoned");
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push(Entry {
                id,
                live: live.clone(),
                callback,
            });
            id
        };

        let registry: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription::new(id, move || {
            live.store(false, Ordering::SeqCst);
            if let Some(registry) = registry.upgrade() {
                let mut registry = registry.lock().expect("listener registry mutex poisoned");
                registry.entries.retain(|entry| entry.id != id);
            }
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.registry
            .lock()
            .expect("listener registry mutex poisoned")
            .entries
            .len()
    }

    pub(crate) fn dispatch(&self, value: &T) -> DispatchReport {
        let entries: Vec<(u64, Arc<AtomicBool>, Callback<T>)> = {
            let registry = self.registry.lock().expect("listener registry mutex poisoned");
            registry
                .entries
                .iter()
                .map(|entry| (entry.id, entry.live.clone(), entry.callback.clone()))
                .collect()
        };

        let mut report = DispatchReport::default();
        for (id, live, callback) in entries {
            if !live.load(Ordering::SeqCst) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| callback(value))) {
                Ok(()) => report.delivered += 1,
                Err(panic) => {
                    report.failed += 1;
                    tracing::error!(
                        listener = self.label,
                        subscriber = id,
                        "subscriber panicked during dispatch: {}",
                        panic_message(panic.as_ref())
                    );
                }
            }
        }
        report
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Handle to a registered callback.
///
/// Dropping the handle unsubscribes. `unsubscribe` may be called any number
/// of times, from any thread, including from inside a callback.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(id: u64, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            release: Some(Box::new(release)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    pub fn unsubscribe(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
