//! Common test utilities for storefront integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use storefront_sync::config::SyncConfig;
use storefront_sync::runtime::headless::{HeadlessNavigator, HeadlessSurface};
use storefront_sync::runtime::memory::InMemoryStore;
use storefront_sync::runtime::notify::{Notice, NoticeLevel, Notifier};
use storefront_sync::runtime::replay::demo_catalog;
use storefront_sync::{Collaborators, Storefront};
use tokio::runtime::Handle;

/// Notifier that keeps every notice.
#[derive(Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|notice| notice.level == NoticeLevel::Error)
            .map(|notice| notice.message.clone())
            .collect()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// A storefront over the demo catalog with its collaborators in reach.
pub struct Session {
    pub storefront: Storefront,
    pub store: Arc<InMemoryStore>,
    pub navigator: Arc<HeadlessNavigator>,
    pub surface: Arc<HeadlessSurface>,
    pub notifier: Arc<CollectingNotifier>,
}

impl Session {
    pub fn start() -> Self {
        Self::start_at("/")
    }

    pub fn start_at(path: &str) -> Self {
        let store = Arc::new(InMemoryStore::new(demo_catalog()));
        let navigator = Arc::new(HeadlessNavigator::at(path));
        let surface = Arc::new(HeadlessSurface::storefront());
        let notifier = Arc::new(CollectingNotifier::default());

        let collaborators = Collaborators::from_store(
            store.clone(),
            navigator.clone(),
            surface.clone(),
            notifier.clone(),
        );
        let storefront = Storefront::assemble(SyncConfig::default(), collaborators, Handle::current());

        Self {
            storefront,
            store,
            navigator,
            surface,
            notifier,
        }
    }

    /// Wait for the router relay to land on `path`.
    pub async fn wait_for_path(&self, path: &str) {
        use storefront_sync::bus::Navigator;

        let reached = tokio::time::timeout(Duration::from_secs(2), async {
            while self.navigator.current_path().as_deref() != Some(path) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(
            reached.is_ok(),
            "navigator stuck at {:?}, expected {path}",
            self.navigator.current_path()
        );
    }
}
