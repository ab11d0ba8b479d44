//! Store event bus.
//!
//! The bus provides:
//! - Synchronous publish/subscribe with per-subscriber failure isolation
//! - An async broadcast stream of the same events for background consumers
//! - A relay task routing navigation side-effects to the router
//!
//! # Architecture
//!
//! Tool invocation → `EventBus::publish` → subscribers (caches, search
//! channel, highlight sequencer) run inline; `StoreEventSync` reads the
//! stream and drives the `Navigator`.

mod event_bus;
pub mod event_types;
mod listeners;
mod sync;

pub use event_bus::{BusEvent, EventBus, DEFAULT_BUS_CAPACITY};
pub use event_types::{HighlightPayload, HighlightRequest, StoreEvent, StoreEventKind, TourStep};
pub use listeners::{DispatchReport, Subscription};
pub(crate) use listeners::ListenerSet;
pub use sync::{Navigator, StoreEventSync};
