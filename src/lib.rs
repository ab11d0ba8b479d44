//! Storefront sync library.
//!
//! Client-side state synchronisation and UI guidance for an AI-assisted
//! storefront. Assistant tools mutate server state through backend
//! collaborators and announce the change on an in-process event bus; the
//! rest of the client reacts to those events.
//!
//! # Architecture
//!
//! The library follows a modular architecture:
//! - `bus`: Event bus (sync subscribers + async stream) and the router relay
//! - `cache`: Optimistic cart and likes caches
//! - `search`: Channel exposing the assistant's latest product search
//! - `highlight`: Highlight / onboarding sequencer and tooltip placement
//! - `tools`: Assistant-callable tools and their registry
//! - `runtime`: Notices, in-memory backend, headless page, replay driver
//! - `config`: Timings and limits, from `.env`, JSON and `STOREFRONT_*`
//! - `core`: Shared domain types and the backend traits

pub mod bus;
pub mod cache;
pub mod config;
pub mod core;
pub mod highlight;
pub mod runtime;
pub mod search;
pub mod tools;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::bus::{EventBus, Navigator, StoreEventSync, Subscription};
use crate::cache::{CacheError, CartCache, LikesCache};
use crate::config::{ConfigError, SyncConfig};
use crate::core::backend::{AccountBackend, BackendError, CartBackend, CatalogBackend, LikesBackend};
use crate::highlight::{HighlightSequencer, HighlightSurface};
use crate::runtime::notify::Notifier;
use crate::search::AiSearchChannel;
use crate::tools::{ToolCallInput, ToolCallOutput, ToolContext, ToolError, ToolRegistry};

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Cache(#[from] CacheError),
    #[error("{0}")]
    Tool(#[from] ToolError),
    #[error("{0}")]
    Backend(#[from] BackendError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Composition root
// ---------------------------------------------------------------------------

/// Everything outside this crate the storefront talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub cart: Arc<dyn CartBackend>,
    pub likes: Arc<dyn LikesBackend>,
    pub catalog: Arc<dyn CatalogBackend>,
    pub account: Arc<dyn AccountBackend>,
    pub navigator: Arc<dyn Navigator>,
    pub surface: Arc<dyn HighlightSurface>,
    pub notifier: Arc<dyn Notifier>,
}

impl Collaborators {
    /// All four backends served by one store.
    pub fn from_store<S>(
        store: Arc<S>,
        navigator: Arc<dyn Navigator>,
        surface: Arc<dyn HighlightSurface>,
        notifier: Arc<dyn Notifier>,
    ) -> Self
    where
        S: CartBackend + LikesBackend + CatalogBackend + AccountBackend + 'static,
    {
        Self {
            cart: store.clone(),
            likes: store.clone(),
            catalog: store.clone(),
            account: store,
            navigator,
            surface,
            notifier,
        }
    }
}

/// One client session: bus, caches, search channel, sequencer and tools,
/// wired together.
///
/// Dropping the storefront (or calling `shutdown`) unsubscribes every
/// consumer, cancels highlight timers and stops the router relay.
pub struct Storefront {
    config: SyncConfig,
    bus: Arc<EventBus>,
    cart: Arc<CartCache>,
    likes: Arc<LikesCache>,
    search: Arc<AiSearchChannel>,
    sequencer: HighlightSequencer,
    tools: ToolRegistry,
    context: ToolContext,
    subscriptions: Vec<Subscription>,
    relay: Option<JoinHandle<()>>,
}

impl Storefront {
    pub fn assemble(config: SyncConfig, collaborators: Collaborators, runtime: Handle) -> Self {
        let bus = Arc::new(EventBus::with_capacity(config.bus_capacity));

        let cart = Arc::new(CartCache::for_backend(
            collaborators.cart.clone(),
            collaborators.notifier.clone(),
        ));
        let likes = Arc::new(LikesCache::for_backend(
            collaborators.likes.clone(),
            collaborators.notifier.clone(),
        ));
        let search = AiSearchChannel::new();
        let sequencer = HighlightSequencer::new(collaborators.surface.clone(), &config, runtime.clone());

        let subscriptions = vec![
            cart.listen(&bus),
            likes.listen(&bus),
            search.attach(&bus),
            sequencer.listen(&bus),
        ];

        let relay = {
            let _guard = runtime.enter();
            StoreEventSync::start(bus.stream(), collaborators.navigator.clone())
        };

        let context = ToolContext {
            bus: bus.clone(),
            cart: collaborators.cart,
            likes: collaborators.likes,
            catalog: collaborators.catalog,
            account: collaborators.account,
            navigator: collaborators.navigator,
            notifier: collaborators.notifier,
            search_limit: config.search_limit,
        };

        tracing::info!(
            subscribers = bus.subscriber_count(),
            capacity = config.bus_capacity,
            "storefront assembled"
        );

        Self {
            config,
            bus,
            cart,
            likes,
            search,
            sequencer,
            tools: ToolRegistry::default(),
            context,
            subscriptions,
            relay: Some(relay),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn cart(&self) -> &Arc<CartCache> {
        &self.cart
    }

    pub fn likes(&self) -> &Arc<LikesCache> {
        &self.likes
    }

    pub fn search(&self) -> &Arc<AiSearchChannel> {
        &self.search
    }

    pub fn sequencer(&self) -> &HighlightSequencer {
        &self.sequencer
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.context.navigator
    }

    /// Run an assistant tool call; failures come back as `ok: false`.
    pub async fn invoke_tool(&self, call: ToolCallInput) -> ToolCallOutput {
        self.tools.dispatch(&self.context, call).await
    }

    /// Load cart and likes together.
    pub async fn prefetch(&self) -> Result<(), SyncError> {
        let (cart, likes) = futures::future::try_join(self.cart.read(), self.likes.read()).await?;
        tracing::debug!(
            cart_lines = cart.items.len(),
            likes = likes.len(),
            "prefetched cart and likes"
        );
        Ok(())
    }

    /// Add `product_id` to the cart from the UI, optimistically.
    pub async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<(), SyncError> {
        let product = self
            .context
            .catalog
            .product(product_id)
            .await?
            .ok_or_else(|| BackendError::NotFound(format!("product {product_id}")))?;
        self.cart.add_item(product, quantity).await?;
        Ok(())
    }

    pub async fn update_cart_item(&self, line_id: &str, quantity: i64) -> Result<(), SyncError> {
        self.cart.update_item(line_id, quantity).await?;
        Ok(())
    }

    pub async fn remove_from_cart(&self, line_id: &str) -> Result<(), SyncError> {
        self.cart.remove_item(line_id).await?;
        Ok(())
    }

    pub async fn toggle_like(&self, product_id: &str) -> Result<(), SyncError> {
        self.likes.toggle_like(product_id).await?;
        Ok(())
    }

    /// Tear down every subscription, timer and the router relay.
    pub fn shutdown(&mut self) {
        for mut subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        self.sequencer.cancel();
        if let Some(relay) = self.relay.take() {
            relay.abort();
        }
        tracing::debug!("storefront shut down");
    }
}

impl Drop for Storefront {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ---------------------------------------------------------------------------
// Application entry point
// ---------------------------------------------------------------------------

/// Install the global tracing subscriber (`RUST_LOG` wins over the default).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("storefront_sync=debug,info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Replay JSON-lines commands from stdin against an in-memory storefront.
///
/// The first argument, when given, is a JSON product catalog; otherwise a
/// small built-in catalog is used.
pub async fn run() -> Result<(), SyncError> {
    init_tracing();

    let config = SyncConfig::load()?;
    let catalog = match std::env::args().nth(1) {
        Some(path) => runtime::replay::load_catalog(&path)?,
        None => runtime::replay::demo_catalog(),
    };

    let store = Arc::new(runtime::memory::InMemoryStore::new(catalog));
    let collaborators = Collaborators::from_store(
        store,
        Arc::new(runtime::headless::HeadlessNavigator::default()),
        Arc::new(runtime::headless::HeadlessSurface::storefront()),
        Arc::new(runtime::notify::TracingNotifier),
    );
    let mut storefront = Storefront::assemble(config, collaborators, Handle::current());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let handled = runtime::replay::run_replay(&storefront, stdin, stdout).await?;

    tracing::info!(commands = handled, "replay finished");
    storefront.shutdown();
    Ok(())
}
