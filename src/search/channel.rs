use std::sync::{Arc, Mutex, OnceLock, Weak};

use serde::Serialize;

use crate::bus::{EventBus, ListenerSet, StoreEvent, Subscription};
use crate::bus::event_types::ProductSearchPayload;
use crate::core::product::Product;

/// Latest assistant-driven search, as shown by the products page banner.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AiSearchSnapshot {
    pub query: Option<String>,
    pub results: Vec<Product>,
    pub is_active: bool,
}

fn default_snapshot() -> &'static Arc<AiSearchSnapshot> {
    static DEFAULT: OnceLock<Arc<AiSearchSnapshot>> = OnceLock::new();
    DEFAULT.get_or_init(|| Arc::new(AiSearchSnapshot::default()))
}

/// Snapshot to render where no client channel exists (server rendering).
pub fn get_server_snapshot() -> Arc<AiSearchSnapshot> {
    default_snapshot().clone()
}

/// Single-slot external store fed by `product-search` events.
///
/// `get_snapshot` returns the same `Arc` until the next search or `clear`,
/// so consumers can detect "no change" with `Arc::ptr_eq`.
pub struct AiSearchChannel {
    current: Mutex<Arc<AiSearchSnapshot>>,
    listeners: ListenerSet<Arc<AiSearchSnapshot>>,
}

impl AiSearchChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            current: Mutex::new(get_server_snapshot()),
            listeners: ListenerSet::new("ai-search"),
        })
    }

    /// Feed the channel from `product-search` events on `bus`.
    pub fn attach(self: &Arc<Self>, bus: &EventBus) -> Subscription {
        let channel: Weak<Self> = Arc::downgrade(self);
        bus.subscribe(move |event| {
            let StoreEvent::ProductSearch(payload) = event else {
                return;
            };
            if let Some(channel) = channel.upgrade() {
                channel.publish_results(payload);
            }
        })
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<AiSearchSnapshot>) + Send + Sync + 'static,
    {
        self.listeners.register(Arc::new(callback))
    }

    pub fn get_snapshot(&self) -> Arc<AiSearchSnapshot> {
        self.current.lock().expect("ai search mutex poisoned").clone()
    }

    /// Reset to the empty snapshot and notify subscribers.
    pub fn clear(&self) {
        self.replace(get_server_snapshot());
    }

    fn publish_results(&self, payload: &ProductSearchPayload) {
        tracing::debug!(
            query = %payload.query,
            results = payload.results.len(),
            "ai search results received"
        );
        self.replace(Arc::new(AiSearchSnapshot {
            query: Some(payload.query.clone()),
            results: payload.results.clone(),
            is_active: true,
        }));
    }

    fn replace(&self, snapshot: Arc<AiSearchSnapshot>) {
        {
            let mut current = self.current.lock().expect("ai search mutex poisoned");
            *current = snapshot.clone();
        }
        self.listeners.dispatch(&snapshot);
    }
}
