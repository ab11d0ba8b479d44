use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::event_types::StoreEvent;
use super::BusEvent;

/// Client-side router collaborator.
pub trait Navigator: Send + Sync {
    /// Path of the page currently shown, when known.
    fn current_path(&self) -> Option<String>;

    /// Client-side transition to an in-app path.
    fn push(&self, path: &str);

    /// Full-page navigation to an external URL.
    fn redirect(&self, url: &str);

    /// Re-fetch server-rendered data for the current page.
    fn refresh(&self);
}

/// Relays routing side-effects from the bus to the [`Navigator`].
///
/// Cache invalidation is handled by the caches' own subscriptions; this relay
/// only covers `navigation`, `checkout` and `profile`.
pub struct StoreEventSync;

impl StoreEventSync {
    /// Spawn a background task draining `rx` until the bus is dropped.
    pub fn start(mut rx: broadcast::Receiver<BusEvent>, navigator: Arc<dyn Navigator>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(envelope) => route(navigator.as_ref(), &envelope),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("store event sync lagged, dropped {n} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("event bus closed, store event sync exiting");
                        break;
                    }
                }
            }
        })
    }
}

fn route(navigator: &dyn Navigator, envelope: &BusEvent) {
    match &envelope.event {
        StoreEvent::Navigation(payload) => {
            if payload.path.is_empty() {
                tracing::warn!(seq = envelope.seq, "navigation event without a path");
                return;
            }
            navigator.push(&payload.path);
        }
        StoreEvent::Checkout(payload) => {
            if payload.url.is_empty() {
                tracing::warn!(seq = envelope.seq, "checkout event without a url");
                return;
            }
            navigator.redirect(&payload.url);
        }
        StoreEvent::Profile(payload) => {
            tracing::debug!(name = ?payload.name, "profile changed, refreshing");
            navigator.refresh();
        }
        _ => {}
    }
}
