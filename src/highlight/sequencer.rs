//! Highlight / onboarding state machine.
//!
//! States: `Idle`, `Highlighting(target)`, `Touring(session)`.
//!
//! Every `highlight` event preempts whatever is running: both epochs are
//! bumped and all timer tasks aborted before the new transition starts. Timer
//! tasks re-check their epoch under the lock, so a timer that already woke
//! up when it was preempted still does nothing.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::surface::{HighlightSurface, Rect};
use super::tooltip::{place_tooltip, TooltipPlacement};
use crate::bus::{EventBus, HighlightPayload, HighlightRequest, StoreEvent, Subscription, TourStep};
use crate::config::{HighlightConfig, SyncConfig, TooltipConfig};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightTarget {
    pub element_id: String,
    pub label: String,
    pub bounding_rect: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TourSession {
    pub steps: Vec<TourStep>,
    pub current_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SequencerState {
    Idle,
    /// A single element is being highlighted (or scrolled to).
    Highlighting { element_id: String },
    Touring(TourSession),
}

/// What the overlay should render right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    pub target: HighlightTarget,
    pub tooltip: TooltipPlacement,
    /// `(step number, step count)` while touring.
    pub step: Option<(usize, usize)>,
}

#[derive(Debug)]
enum Mode {
    Idle,
    Single { element_id: String },
    Tour(TourSession),
}

struct Inner {
    mode: Mode,
    target: Option<HighlightTarget>,
    session_epoch: u64,
    highlight_epoch: u64,
    highlight_timers: Vec<JoinHandle<()>>,
    tour_timer: Option<JoinHandle<()>>,
}

impl Inner {
    fn abort_highlight_timers(&mut self) {
        for timer in self.highlight_timers.drain(..) {
            timer.abort();
        }
    }

    fn abort_all(&mut self) {
        self.abort_highlight_timers();
        if let Some(timer) = self.tour_timer.take() {
            timer.abort();
        }
    }

    fn is_touring(&self) -> bool {
        matches!(self.mode, Mode::Tour(_))
    }

    /// Single highlights end in `Idle`; tours stay put until the tour timer fires.
    fn end_single(&mut self) {
        if matches!(self.mode, Mode::Single { .. }) {
            self.mode = Mode::Idle;
        }
    }
}

struct SequencerCore {
    surface: Arc<dyn HighlightSurface>,
    config: HighlightConfig,
    tooltip: TooltipConfig,
    runtime: Handle,
    this: Weak<SequencerCore>,
    inner: Mutex<Inner>,
}

/// Drives highlight and onboarding presentation from bus events.
///
/// Dropping the sequencer cancels every pending timer and clears the surface.
pub struct HighlightSequencer {
    core: Arc<SequencerCore>,
}

impl HighlightSequencer {
    pub fn new(surface: Arc<dyn HighlightSurface>, config: &SyncConfig, runtime: Handle) -> Self {
        let core = Arc::new_cyclic(|this| SequencerCore {
            surface,
            config: config.highlight.clone(),
            tooltip: config.tooltip.clone(),
            runtime,
            this: this.clone(),
            inner: Mutex::new(Inner {
                mode: Mode::Idle,
                target: None,
                session_epoch: 0,
                highlight_epoch: 0,
                highlight_timers: Vec::new(),
                tour_timer: None,
            }),
        });
        Self { core }
    }

    /// React to `highlight` events published on `bus`.
    pub fn listen(&self, bus: &EventBus) -> Subscription {
        let core = Arc::downgrade(&self.core);
        bus.subscribe(move |event| {
            let StoreEvent::Highlight(payload) = event else {
                return;
            };
            if let Some(core) = core.upgrade() {
                core.handle_payload(payload);
            }
        })
    }

    pub fn handle_payload(&self, payload: &HighlightPayload) {
        self.core.handle_payload(payload);
    }

    pub fn state(&self) -> SequencerState {
        let inner = self.core.lock();
        match &inner.mode {
            Mode::Idle => SequencerState::Idle,
            Mode::Single { element_id } => SequencerState::Highlighting {
                element_id: element_id.clone(),
            },
            Mode::Tour(session) => SequencerState::Touring(session.clone()),
        }
    }

    /// Element currently shown as active, if any.
    pub fn active_target(&self) -> Option<HighlightTarget> {
        self.core.lock().target.clone()
    }

    /// Re-measure the active target after a scroll or resize. Timers are untouched.
    pub fn on_viewport_change(&self) {
        self.core.on_viewport_change();
    }

    pub fn overlay(&self) -> Option<OverlayView> {
        let inner = self.core.lock();
        let target = inner.target.as_ref()?;
        let rect = target.bounding_rect?;
        if target.label.is_empty() {
            return None;
        }
        let tooltip = place_tooltip(&rect, &self.core.surface.viewport(), &self.core.tooltip);
        let step = match &inner.mode {
            Mode::Tour(session) => Some((session.current_index + 1, session.steps.len())),
            _ => None,
        };
        Some(OverlayView {
            target: target.clone(),
            tooltip,
            step,
        })
    }

    /// Cancel everything and return to `Idle`.
    pub fn cancel(&self) {
        self.core.teardown();
    }
}

impl Drop for HighlightSequencer {
    fn drop(&mut self) {
        self.core.teardown();
    }
}

impl SequencerCore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("highlight sequencer mutex poisoned")
    }

    fn handle_payload(&self, payload: &HighlightPayload) {
        let Some(request) = payload.request() else {
            tracing::debug!("highlight event without element or steps ignored");
            return;
        };

        let mut inner = self.lock();
        Self::preempt(&mut inner);

        match request {
            HighlightRequest::Single {
                element_id,
                label,
                duration_ms,
            } => {
                let duration = Duration::from_millis(duration_ms.unwrap_or(self.config.default_duration_ms));
                inner.mode = Mode::Single {
                    element_id: element_id.clone(),
                };
                self.highlight_element(&mut inner, element_id, label, duration);
            }
            HighlightRequest::Tour(steps) => {
                tracing::info!(steps = steps.len(), "starting onboarding tour");
                inner.mode = Mode::Tour(TourSession {
                    steps,
                    current_index: 0,
                });
                let epoch = inner.session_epoch;
                self.run_step(&mut inner, epoch, 0);
            }
        }
    }

    fn preempt(inner: &mut Inner) {
        inner.session_epoch += 1;
        inner.highlight_epoch += 1;
        inner.abort_all();
    }

    fn teardown(&self) {
        let mut inner = self.lock();
        Self::preempt(&mut inner);
        inner.mode = Mode::Idle;
        inner.target = None;
        self.surface.clear_all();
    }

    fn schedule<F>(&self, delay: Duration, fire: F) -> JoinHandle<()>
    where
        F: FnOnce(&SequencerCore) + Send + 'static,
    {
        let core = self.this.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(core) = core.upgrade() {
                fire(&core);
            }
        })
    }

    /// Clear the previous highlight, then scroll to `element_id` and arm the
    /// settle timer.
    fn highlight_element(&self, inner: &mut Inner, element_id: String, label: String, duration: Duration) {
        inner.highlight_epoch += 1;
        inner.abort_highlight_timers();
        self.surface.clear_all();
        inner.target = None;

        if self.surface.locate(&element_id).is_none() {
            tracing::warn!(element_id = %element_id, "highlight target not found");
            inner.end_single();
            return;
        }

        self.surface.scroll_into_view(&element_id);

        let epoch = inner.highlight_epoch;
        let settle = self.schedule(self.config.settle_delay(), move |core| {
            core.on_settled(epoch, element_id, label, duration);
        });
        inner.highlight_timers.push(settle);
    }

    fn on_settled(&self, epoch: u64, element_id: String, label: String, duration: Duration) {
        let mut inner = self.lock();
        if inner.highlight_epoch != epoch {
            return;
        }
        inner.highlight_timers.retain(|timer| !timer.is_finished());

        let Some(rect) = self.surface.locate(&element_id) else {
            tracing::warn!(element_id = %element_id, "highlight target disappeared while scrolling");
            inner.end_single();
            return;
        };

        self.surface.set_active(&element_id, true);
        tracing::debug!(element_id = %element_id, "highlight active");
        inner.target = Some(HighlightTarget {
            element_id: element_id.clone(),
            label,
            bounding_rect: Some(rect),
        });

        let expire = self.schedule(duration, move |core| core.on_expired(epoch, element_id));
        inner.highlight_timers.push(expire);
    }

    fn on_expired(&self, epoch: u64, element_id: String) {
        let mut inner = self.lock();
        if inner.highlight_epoch != epoch {
            return;
        }
        self.surface.set_active(&element_id, false);
        inner.target = None;
        inner.highlight_timers.clear();
        inner.end_single();
    }

    fn run_step(&self, inner: &mut Inner, session_epoch: u64, index: usize) {
        let step = match &mut inner.mode {
            Mode::Tour(session) => {
                if index < session.steps.len() {
                    session.current_index = index;
                }
                session.steps.get(index).cloned()
            }
            _ => return,
        };

        let Some(step) = step else {
            tracing::info!(steps = index, "onboarding tour finished");
            inner.highlight_epoch += 1;
            inner.abort_all();
            inner.mode = Mode::Idle;
            inner.target = None;
            self.surface.clear_all();
            return;
        };

        let duration = Duration::from_millis(step.duration_ms.unwrap_or(self.config.tour_step_ms));
        tracing::debug!(index, element_id = %step.element_id, "tour step");
        self.highlight_element(inner, step.element_id, step.label, duration);

        let next = self.schedule(duration + self.config.tour_gap(), move |core| {
            core.on_advance(session_epoch, index + 1);
        });
        inner.tour_timer = Some(next);
    }

    fn on_advance(&self, session_epoch: u64, next: usize) {
        let mut inner = self.lock();
        if inner.session_epoch != session_epoch || !inner.is_touring() {
            return;
        }
        inner.tour_timer = None;
        self.run_step(&mut inner, session_epoch, next);
    }

    fn on_viewport_change(&self) {
        let mut inner = self.lock();
        let Some(target) = inner.target.as_mut() else {
            return;
        };
        if let Some(rect) = self.surface.locate(&target.element_id) {
            target.bounding_rect = Some(rect);
        }
    }
}
