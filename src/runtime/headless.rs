//! Page and router stand-ins for running without a browser.
//!
//! `HeadlessSurface` keeps a fixed element layout and tracks which elements
//! carry the active treatment. `HeadlessNavigator` keeps the current path
//! and a history of every transition.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::bus::Navigator;
use crate::highlight::{HighlightSurface, Rect, Viewport};

pub const DEFAULT_VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 800.0,
};

pub struct HeadlessSurface {
    layout: Mutex<HashMap<String, Rect>>,
    active: Mutex<BTreeSet<String>>,
    viewport: Mutex<Viewport>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT)
    }
}

impl HeadlessSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            layout: Mutex::new(HashMap::new()),
            active: Mutex::new(BTreeSet::new()),
            viewport: Mutex::new(viewport),
        }
    }

    /// Storefront header and home sections laid out on a 1280×800 page.
    pub fn storefront() -> Self {
        let surface = Self::default();
        for (element_id, rect) in [
            ("logo", Rect::new(24.0, 16.0, 120.0, 40.0)),
            ("nav-home", Rect::new(200.0, 20.0, 60.0, 32.0)),
            ("nav-products", Rect::new(280.0, 20.0, 90.0, 32.0)),
            ("nav-categories", Rect::new(390.0, 20.0, 100.0, 32.0)),
            ("nav-deals", Rect::new(510.0, 20.0, 60.0, 32.0)),
            ("search-button", Rect::new(1080.0, 20.0, 36.0, 36.0)),
            ("cart-button", Rect::new(1140.0, 20.0, 36.0, 36.0)),
            ("user-menu", Rect::new(1200.0, 20.0, 56.0, 36.0)),
            ("hero-section", Rect::new(0.0, 80.0, 1280.0, 420.0)),
            ("shop-now-button", Rect::new(560.0, 400.0, 160.0, 48.0)),
            ("featured-products", Rect::new(0.0, 540.0, 1280.0, 480.0)),
            ("categories-section", Rect::new(0.0, 1060.0, 1280.0, 360.0)),
            ("newsletter-section", Rect::new(0.0, 1460.0, 1280.0, 240.0)),
            ("footer", Rect::new(0.0, 1740.0, 1280.0, 200.0)),
        ] {
            surface.place(element_id, rect);
        }
        surface
    }

    /// Put an element on the page, or move it.
    pub fn place(&self, element_id: impl Into<String>, rect: Rect) {
        self.layout
            .lock()
            .expect("surface layout mutex poisoned")
            .insert(element_id.into(), rect);
    }

    /// Take an element off the page.
    pub fn remove(&self, element_id: &str) {
        self.layout
            .lock()
            .expect("surface layout mutex poisoned")
            .remove(element_id);
        self.active
            .lock()
            .expect("surface active mutex poisoned")
            .remove(element_id);
    }

    pub fn resize(&self, viewport: Viewport) {
        *self.viewport.lock().expect("surface viewport mutex poisoned") = viewport;
    }

    pub fn active_elements(&self) -> Vec<String> {
        self.active
            .lock()
            .expect("surface active mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

impl HighlightSurface for HeadlessSurface {
    fn locate(&self, element_id: &str) -> Option<Rect> {
        self.layout
            .lock()
            .expect("surface layout mutex poisoned")
            .get(element_id)
            .copied()
    }

    fn scroll_into_view(&self, element_id: &str) {
        tracing::debug!(element_id, "scroll into view");
    }

    fn set_active(&self, element_id: &str, active: bool) {
        let mut set = self.active.lock().expect("surface active mutex poisoned");
        if active {
            set.insert(element_id.to_string());
        } else {
            set.remove(element_id);
        }
    }

    fn clear_all(&self) {
        self.active.lock().expect("surface active mutex poisoned").clear();
    }

    fn viewport(&self) -> Viewport {
        *self.viewport.lock().expect("surface viewport mutex poisoned")
    }
}

/// One router transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "lowercase")]
pub enum RouteChange {
    Push(String),
    Redirect(String),
    Refresh,
}

pub struct HeadlessNavigator {
    current: Mutex<String>,
    history: Mutex<Vec<RouteChange>>,
}

impl Default for HeadlessNavigator {
    fn default() -> Self {
        Self::at("/")
    }
}

impl HeadlessNavigator {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(path.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn history(&self) -> Vec<RouteChange> {
        self.history.lock().expect("navigator history mutex poisoned").clone()
    }

    fn record(&self, change: RouteChange) {
        self.history
            .lock()
            .expect("navigator history mutex poisoned")
            .push(change);
    }
}

impl Navigator for HeadlessNavigator {
    fn current_path(&self) -> Option<String> {
        Some(self.current.lock().expect("navigator path mutex poisoned").clone())
    }

    fn push(&self, path: &str) {
        tracing::info!(path, "navigate");
        *self.current.lock().expect("navigator path mutex poisoned") = path.to_string();
        self.record(RouteChange::Push(path.to_string()));
    }

    fn redirect(&self, url: &str) {
        tracing::info!(url, "redirect");
        self.record(RouteChange::Redirect(url.to_string()));
    }

    fn refresh(&self) {
        tracing::debug!("refresh");
        self.record(RouteChange::Refresh);
    }
}
