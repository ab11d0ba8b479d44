use std::sync::Arc;

use async_trait::async_trait;

use super::optimistic::{CacheError, OptimisticCache, Resource};
use crate::bus::StoreEventKind;
use crate::core::backend::{BackendError, LikesBackend};
use crate::core::likes::{LikesIntent, LikesSnapshot};
use crate::runtime::notify::Notifier;

pub struct LikesResource {
    backend: Arc<dyn LikesBackend>,
}

impl LikesResource {
    pub fn new(backend: Arc<dyn LikesBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Resource for LikesResource {
    type Snapshot = LikesSnapshot;
    type Intent = LikesIntent;

    const NAME: &'static str = "likes";
    const INVALIDATED_BY: StoreEventKind = StoreEventKind::Likes;

    async fn fetch(&self) -> Result<LikesSnapshot, BackendError> {
        self.backend.fetch_likes().await
    }

    fn apply(&self, current: &LikesSnapshot, intent: &LikesIntent) -> LikesSnapshot {
        intent.apply(current)
    }

    async fn commit(&self, intent: &LikesIntent) -> Result<(), BackendError> {
        match intent {
            LikesIntent::Toggle { product_id } => {
                let liked = self.backend.toggle_like(product_id).await?;
                tracing::debug!(product_id = %product_id, liked, "like toggled");
                Ok(())
            }
        }
    }

    fn failure_message(&self, _intent: &LikesIntent) -> String {
        "Couldn't update your likes. Please try again.".to_string()
    }
}

pub type LikesCache = OptimisticCache<LikesResource>;

impl OptimisticCache<LikesResource> {
    pub fn for_backend(backend: Arc<dyn LikesBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(LikesResource::new(backend), notifier)
    }

    pub async fn toggle_like(&self, product_id: &str) -> Result<(), CacheError> {
        self.mutate(LikesIntent::toggle(product_id)).await
    }

    /// Membership in the current (possibly optimistic) snapshot.
    pub fn is_liked(&self, product_id: &str) -> bool {
        self.snapshot().contains(product_id)
    }
}
