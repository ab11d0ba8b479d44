use serde::{Deserialize, Serialize};

/// Attribute every highlightable element carries; its value is the element id.
pub const HIGHLIGHT_ATTRIBUTE: &str = "data-highlight";

/// Viewport-relative bounding box, CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// The rendered page, as far as the sequencer needs it.
///
/// Elements are addressed only by their [`HIGHLIGHT_ATTRIBUTE`] value.
pub trait HighlightSurface: Send + Sync {
    /// Bounding box of the element, or `None` when it is not on the page.
    fn locate(&self, element_id: &str) -> Option<Rect>;

    /// Smooth-scroll the element to the vertical centre of the viewport.
    fn scroll_into_view(&self, element_id: &str);

    /// Add or remove the active highlight treatment.
    fn set_active(&self, element_id: &str, active: bool);

    /// Remove the active treatment from every element.
    fn clear_all(&self);

    fn viewport(&self) -> Viewport;
}
