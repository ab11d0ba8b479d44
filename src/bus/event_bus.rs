use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::event_types::StoreEvent;
use super::listeners::{DispatchReport, ListenerSet, Subscription};

pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// Envelope carried on the async stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
    pub id: String,
    pub seq: u64,
    pub created_at: String,
    pub event: StoreEvent,
}

/// In-process publish/subscribe channel for store events.
///
/// Synchronous subscribers run inside `publish`, in registration order.
/// Async consumers read the same events, in publish order, from [`EventBus::stream`].
pub struct EventBus {
    listeners: ListenerSet<StoreEvent>,
    tx: broadcast::Sender<BusEvent>,
    seq: AtomicU64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            listeners: ListenerSet::new("event-bus"),
            tx,
            seq: AtomicU64::new(0),
        }
    }

    /// Register a synchronous subscriber. Registering the same closure twice
    /// yields two independent subscriptions.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.listeners.register(Arc::new(callback))
    }

    /// Deliver `event` to every current subscriber, then to the async stream.
    ///
    /// A panicking subscriber is logged and skipped; the publisher never sees it.
    pub fn publish(&self, event: StoreEvent) -> DispatchReport {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(kind = %event.kind(), seq, "publishing store event");

        let report = self.listeners.dispatch(&event);
        if report.failed > 0 {
            tracing::warn!(
                kind = %event.kind(),
                seq,
                failed = report.failed,
                "store event delivered with subscriber failures"
            );
        }

        if self.tx.receiver_count() > 0 {
            let envelope = BusEvent {
                id: Uuid::new_v4().to_string(),
                seq,
                created_at: Utc::now().to_rfc3339(),
                event,
            };
            if let Err(e) = self.tx.send(envelope) {
                tracing::debug!("event stream send skipped: {e}");
            }
        }

        report
    }

    /// Get a new receiver for the async stream. Events published before this
    /// call are not replayed.
    pub fn stream(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}
