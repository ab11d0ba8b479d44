//! Generic optimistic cache over a server-backed resource.
//!
//! The cached value is an `Arc<Snapshot>` that is swapped, never edited, so
//! a reader holding an older `Arc` always sees a complete snapshot.
//!
//! Overlapping mutations on the same resource are not serialized. Each
//! mutation rolls back to the snapshot it captured itself, so a failure can
//! discard another mutation's optimistic effect until the next refetch.

use std::fmt::Debug;
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use serde::Serialize;

use crate::bus::{EventBus, StoreEventKind, Subscription};
use crate::core::backend::BackendError;
use crate::runtime::notify::{Notice, Notifier};

/// A server-backed collection the cache can hold.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    type Snapshot: Clone + Default + PartialEq + Debug + Send + Sync + 'static;
    type Intent: Debug + Send + Sync;

    /// Name used in logs and errors.
    const NAME: &'static str;
    /// Bus event that means "the server copy changed, refetch".
    const INVALIDATED_BY: StoreEventKind;

    async fn fetch(&self) -> Result<Self::Snapshot, BackendError>;

    /// Snapshot expected once `intent` has been committed.
    fn apply(&self, current: &Self::Snapshot, intent: &Self::Intent) -> Self::Snapshot;

    async fn commit(&self, intent: &Self::Intent) -> Result<(), BackendError>;

    /// User-facing message shown when `intent` is rejected.
    fn failure_message(&self, intent: &Self::Intent) -> String;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("{resource} fetch failed: {source}")]
    Fetch {
        resource: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("{resource} mutation rejected: {source}")]
    MutationRejected {
        resource: &'static str,
        #[source]
        source: BackendError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Never loaded and nothing in flight.
    Empty,
    /// First fetch or refetch in progress.
    Loading,
    Fresh,
    /// Snapshot present but a refetch is required before it is trusted.
    Stale,
}

/// Synchronous view of the cache for rendering.
#[derive(Debug, Clone)]
pub struct CacheView<S> {
    pub snapshot: Option<Arc<S>>,
    pub status: CacheStatus,
    pub pending_mutations: usize,
}

struct CacheState<S> {
    snapshot: Option<Arc<S>>,
    stale: bool,
    loading: bool,
    /// Bumped whenever the snapshot is replaced locally or a mutation settles.
    version: u64,
    pending_mutations: usize,
}

/// Captured before a speculative write; owned by that one mutation.
struct MutationContext<S> {
    previous: Option<Arc<S>>,
}

pub struct OptimisticCache<R: Resource> {
    resource: R,
    notifier: Arc<dyn Notifier>,
    state: Mutex<CacheState<R::Snapshot>>,
}

impl<R: Resource> OptimisticCache<R> {
    pub fn new(resource: R, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            resource,
            notifier,
            state: Mutex::new(CacheState {
                snapshot: None,
                stale: false,
                loading: false,
                version: 0,
                pending_mutations: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState<R::Snapshot>> {
        self.state.lock().expect("optimistic cache mutex poisoned")
    }

    /// Current snapshot, fetching first when the cache is empty or stale.
    pub async fn read(&self) -> Result<Arc<R::Snapshot>, CacheError> {
        let started_at = {
            let mut state = self.lock();
            if let (Some(snapshot), false) = (&state.snapshot, state.stale) {
                return Ok(snapshot.clone());
            }
            state.loading = true;
            state.version
        };

        let fetched = self.resource.fetch().await;

        let mut state = self.lock();
        state.loading = false;
        match fetched {
            Ok(snapshot) => {
                if state.version != started_at {
                    // A local write landed while fetching; keep it and stay stale.
                    tracing::debug!(resource = R::NAME, "discarding fetch superseded by a local write");
                    if let Some(current) = &state.snapshot {
                        return Ok(current.clone());
                    }
                }
                let snapshot = Arc::new(snapshot);
                state.snapshot = Some(snapshot.clone());
                state.stale = false;
                state.version += 1;
                Ok(snapshot)
            }
            Err(source) => {
                tracing::warn!(resource = R::NAME, "fetch failed: {source}");
                Err(CacheError::Fetch {
                    resource: R::NAME,
                    source,
                })
            }
        }
    }

    /// Non-blocking view; never triggers a fetch.
    pub fn peek(&self) -> CacheView<R::Snapshot> {
        let state = self.lock();
        let status = if state.loading {
            CacheStatus::Loading
        } else if state.snapshot.is_none() {
            CacheStatus::Empty
        } else if state.stale {
            CacheStatus::Stale
        } else {
            CacheStatus::Fresh
        };
        CacheView {
            snapshot: state.snapshot.clone(),
            status,
            pending_mutations: state.pending_mutations,
        }
    }

    /// Current snapshot or the empty default, without fetching.
    pub fn snapshot(&self) -> Arc<R::Snapshot> {
        self.lock().snapshot.clone().unwrap_or_default()
    }

    /// Require a refetch before the next `read` is trusted.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        if state.snapshot.is_some() {
            state.stale = true;
        }
        tracing::debug!(resource = R::NAME, "cache invalidated");
    }

    /// Install a server snapshot obtained elsewhere (e.g. server-rendered).
    pub fn hydrate(&self, snapshot: R::Snapshot) {
        let mut state = self.lock();
        state.snapshot = Some(Arc::new(snapshot));
        state.stale = false;
        state.version += 1;
    }

    /// Apply `intent` locally, commit it, and roll back if the server rejects it.
    ///
    /// Failures are absorbed here: the snapshot is restored, the user gets a
    /// notice, and the error is returned for callers that want it.
    pub async fn mutate(&self, intent: R::Intent) -> Result<(), CacheError> {
        let context = self.begin(&intent);

        let committed = self.resource.commit(&intent).await;

        let mut state = self.lock();
        state.pending_mutations = state.pending_mutations.saturating_sub(1);
        match committed {
            Ok(()) => {
                // A fetch that started before this settle saw the pre-commit server copy.
                state.stale = state.snapshot.is_some();
                state.version += 1;
                tracing::debug!(resource = R::NAME, ?intent, "mutation committed");
                Ok(())
            }
            Err(source) => {
                state.snapshot = context.previous;
                state.stale = state.snapshot.is_some();
                state.version += 1;
                drop(state);

                tracing::warn!(resource = R::NAME, ?intent, "mutation rejected, rolled back: {source}");
                self.notifier
                    .notify(Notice::error(self.resource.failure_message(&intent)));
                Err(CacheError::MutationRejected {
                    resource: R::NAME,
                    source,
                })
            }
        }
    }

    fn begin(&self, intent: &R::Intent) -> MutationContext<R::Snapshot> {
        let mut state = self.lock();
        let previous = state.snapshot.clone();
        let base = previous.clone().unwrap_or_default();
        state.snapshot = Some(Arc::new(self.resource.apply(&base, intent)));
        if previous.is_none() {
            // Built on an empty default, not on server data.
            state.stale = true;
        }
        state.version += 1;
        state.pending_mutations += 1;
        MutationContext { previous }
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }
}

impl<R: Resource> OptimisticCache<R> {
    /// Invalidate this cache whenever the bus reports its resource changed.
    pub fn listen(self: &Arc<Self>, bus: &EventBus) -> Subscription {
        let cache: Weak<Self> = Arc::downgrade(self);
        bus.subscribe(move |event| {
            if event.kind() != R::INVALIDATED_BY {
                return;
            }
            if let Some(cache) = cache.upgrade() {
                cache.invalidate();
            }
        })
    }
}
