//! Test doubles shared by the unit tests.
//!
//! - `RecordingSurface`: page stand-in that timestamps every call
//! - `RecordingNotifier`: keeps every notice
//! - `ScriptedBackend`: cart + likes backend with switchable failures and
//!   gates that hold fetches or commits until released

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Semaphore;
use tokio::time::Instant;

use crate::core::backend::{BackendError, CartBackend, LikesBackend};
use crate::core::cart::{CartLine, CartSnapshot};
use crate::core::likes::LikesSnapshot;
use crate::core::product::Product;
use crate::highlight::{HighlightSurface, Rect, Viewport};
use crate::runtime::notify::{Notice, NoticeLevel, Notifier};

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Scroll(String),
    Activate(String),
    Deactivate(String),
    ClearAll,
}

pub struct RecordingSurface {
    started: Instant,
    layout: Mutex<HashMap<String, Rect>>,
    viewport: Mutex<Viewport>,
    calls: Mutex<Vec<(Duration, SurfaceCall)>>,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Instant::now(),
            layout: Mutex::new(HashMap::new()),
            viewport: Mutex::new(Viewport {
                width: 1280.0,
                height: 800.0,
            }),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// A surface with each id laid out in a row near the middle of the page.
    pub fn with_elements(ids: &[&str]) -> Arc<Self> {
        let surface = Self::new();
        for (i, id) in ids.iter().enumerate() {
            surface.place(id, Rect::new(100.0 + 150.0 * i as f64, 300.0, 120.0, 40.0));
        }
        surface
    }

    pub fn place(&self, id: &str, rect: Rect) {
        self.layout.lock().unwrap().insert(id.to_string(), rect);
    }

    pub fn remove(&self, id: &str) {
        self.layout.lock().unwrap().remove(id);
    }

    pub fn resize(&self, width: f64, height: f64) {
        *self.viewport.lock().unwrap() = Viewport { width, height };
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().iter().map(|(_, call)| call.clone()).collect()
    }

    /// `(elapsed, element_id)` for every activation, in order.
    pub fn activations(&self) -> Vec<(Duration, String)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(at, call)| match call {
                SurfaceCall::Activate(id) => Some((*at, id.clone())),
                _ => None,
            })
            .collect()
    }

    /// `(elapsed, element_id)` for every deactivation, in order.
    pub fn deactivations(&self) -> Vec<(Duration, String)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|(at, call)| match call {
                SurfaceCall::Deactivate(id) => Some((*at, id.clone())),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: SurfaceCall) {
        let at = self.started.elapsed();
        self.calls.lock().unwrap().push((at, call));
    }
}

impl HighlightSurface for RecordingSurface {
    fn locate(&self, element_id: &str) -> Option<Rect> {
        self.layout.lock().unwrap().get(element_id).copied()
    }

    fn scroll_into_view(&self, element_id: &str) {
        self.record(SurfaceCall::Scroll(element_id.to_string()));
    }

    fn set_active(&self, element_id: &str, active: bool) {
        if active {
            self.record(SurfaceCall::Activate(element_id.to_string()));
        } else {
            self.record(SurfaceCall::Deactivate(element_id.to_string()));
        }
    }

    fn clear_all(&self) {
        self.record(SurfaceCall::ClearAll);
    }

    fn viewport(&self) -> Viewport {
        *self.viewport.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|notice| notice.level == NoticeLevel::Error)
            .map(|notice| notice.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

pub fn product(id: &str, price: f64) -> Product {
    Product::new(id, format!("Product {id}"), price)
}

pub fn line(id: &str, product: Product, quantity: u32) -> CartLine {
    CartLine {
        id: id.to_string(),
        product_id: product.id.clone(),
        quantity,
        added_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        product: Some(product),
    }
}

/// Cart and likes backend whose server state is set directly by the test.
///
/// Commits never change the server copy; tests set the post-commit state
/// with `set_cart` / `set_likes` when they need a refetch to see it.
pub struct ScriptedBackend {
    cart: Mutex<CartSnapshot>,
    likes: Mutex<LikesSnapshot>,
    fail_commits: AtomicBool,
    fail_fetches: AtomicBool,
    gate_commits: AtomicBool,
    gate_fetches: AtomicBool,
    commit_gate: Semaphore,
    fetch_gate: Semaphore,
    fetches: AtomicUsize,
    commits: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(cart: CartSnapshot) -> Arc<Self> {
        Arc::new(Self {
            cart: Mutex::new(cart),
            likes: Mutex::new(LikesSnapshot::default()),
            fail_commits: AtomicBool::new(false),
            fail_fetches: AtomicBool::new(false),
            gate_commits: AtomicBool::new(false),
            gate_fetches: AtomicBool::new(false),
            commit_gate: Semaphore::new(0),
            fetch_gate: Semaphore::new(0),
            fetches: AtomicUsize::new(0),
            commits: Mutex::new(Vec::new()),
        })
    }

    pub fn set_cart(&self, cart: CartSnapshot) {
        *self.cart.lock().unwrap() = cart;
    }

    pub fn set_likes(&self, likes: LikesSnapshot) {
        *self.likes.lock().unwrap() = likes;
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Hold every commit until `release_commit` is called.
    pub fn gate_commits(&self) {
        self.gate_commits.store(true, Ordering::SeqCst);
    }

    pub fn release_commit(&self) {
        self.commit_gate.add_permits(1);
    }

    /// Hold every fetch until `release_fetch` is called.
    pub fn gate_fetches(&self) {
        self.gate_fetches.store(true, Ordering::SeqCst);
    }

    pub fn release_fetch(&self) {
        self.fetch_gate.add_permits(1);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> Vec<String> {
        self.commits.lock().unwrap().clone()
    }

    async fn before_fetch(&self) -> Result<(), BackendError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.gate_fetches.load(Ordering::SeqCst) {
            self.fetch_gate.acquire().await.unwrap().forget();
        }
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(BackendError::Transport("fetch failed".into()));
        }
        Ok(())
    }

    async fn commit(&self, what: String) -> Result<(), BackendError> {
        self.commits.lock().unwrap().push(what);
        if self.gate_commits.load(Ordering::SeqCst) {
            self.commit_gate.acquire().await.unwrap().forget();
        }
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(BackendError::Rejected("server said no".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CartBackend for ScriptedBackend {
    async fn fetch_cart(&self) -> Result<CartSnapshot, BackendError> {
        self.before_fetch().await?;
        Ok(self.cart.lock().unwrap().clone())
    }

    async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<(), BackendError> {
        self.commit(format!("add {product_id} x{quantity}")).await
    }

    async fn update_cart_item(&self, line_id: &str, quantity: i64) -> Result<(), BackendError> {
        self.commit(format!("update {line_id} ={quantity}")).await
    }

    async fn remove_from_cart(&self, line_id: &str) -> Result<(), BackendError> {
        self.commit(format!("remove {line_id}")).await
    }
}

#[async_trait]
impl LikesBackend for ScriptedBackend {
    async fn fetch_likes(&self) -> Result<LikesSnapshot, BackendError> {
        self.before_fetch().await?;
        Ok(self.likes.lock().unwrap().clone())
    }

    async fn toggle_like(&self, product_id: &str) -> Result<bool, BackendError> {
        self.commit(format!("toggle {product_id}")).await?;
        Ok(!self.likes.lock().unwrap().contains(product_id))
    }
}
