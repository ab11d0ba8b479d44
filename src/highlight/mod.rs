//! UI highlight and onboarding tour sequencing.
//!
//! - `surface`: the page boundary (element lookup by `data-highlight`)
//! - `tooltip`: label placement next to the highlighted element
//! - `sequencer`: the state machine driven by `highlight` events

mod sequencer;
pub mod surface;
pub mod tooltip;

pub use sequencer::{HighlightSequencer, HighlightTarget, OverlayView, SequencerState, TourSession};
pub use surface::{HighlightSurface, Rect, Viewport, HIGHLIGHT_ATTRIBUTE};
pub use tooltip::{place_tooltip, TooltipPlacement, TooltipSide};
