use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::optimistic::{CacheError, OptimisticCache, Resource};
use crate::bus::StoreEventKind;
use crate::core::backend::{BackendError, CartBackend};
use crate::core::cart::{CartIntent, CartSnapshot};
use crate::core::product::Product;
use crate::runtime::notify::Notifier;

pub struct CartResource {
    backend: Arc<dyn CartBackend>,
}

impl CartResource {
    pub fn new(backend: Arc<dyn CartBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Resource for CartResource {
    type Snapshot = CartSnapshot;
    type Intent = CartIntent;

    const NAME: &'static str = "cart";
    const INVALIDATED_BY: StoreEventKind = StoreEventKind::Cart;

    async fn fetch(&self) -> Result<CartSnapshot, BackendError> {
        self.backend.fetch_cart().await
    }

    fn apply(&self, current: &CartSnapshot, intent: &CartIntent) -> CartSnapshot {
        intent.apply(current, Utc::now())
    }

    async fn commit(&self, intent: &CartIntent) -> Result<(), BackendError> {
        match intent {
            CartIntent::Add { product, quantity } => {
                self.backend.add_to_cart(&product.id, (*quantity).max(1)).await
            }
            CartIntent::SetQuantity { line_id, quantity } => {
                self.backend.update_cart_item(line_id, *quantity).await
            }
            CartIntent::Remove { line_id } => self.backend.remove_from_cart(line_id).await,
        }
    }

    fn failure_message(&self, intent: &CartIntent) -> String {
        match intent {
            CartIntent::Add { product, .. } => format!("Couldn't add {} to your cart", product.name),
            other => format!("Couldn't {}. Please try again.", other.describe()),
        }
    }
}

pub type CartCache = OptimisticCache<CartResource>;

impl OptimisticCache<CartResource> {
    pub fn for_backend(backend: Arc<dyn CartBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(CartResource::new(backend), notifier)
    }

    pub async fn add_item(&self, product: Product, quantity: u32) -> Result<(), CacheError> {
        self.mutate(CartIntent::add(product, quantity)).await
    }

    /// Zero or negative quantities remove the line.
    pub async fn update_item(&self, line_id: &str, quantity: i64) -> Result<(), CacheError> {
        self.mutate(CartIntent::set_quantity(line_id, quantity)).await
    }

    pub async fn remove_item(&self, line_id: &str) -> Result<(), CacheError> {
        self.mutate(CartIntent::remove(line_id)).await
    }
}
