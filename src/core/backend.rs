//! Server collaborator boundary.
//!
//! The storefront's server actions (ORM-backed cart and likes, catalog
//! lookups, auth/account and payment sessions) live outside this crate.
//! These traits are the only shape the sync layer depends on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::cart::CartSnapshot;
use crate::core::likes::LikesSnapshot;
use crate::core::product::{Category, Product, ProductFilters};

/// Failures reported by a server collaborator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// What the current session may do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub authenticated: bool,
    pub is_admin: bool,
}

#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Authoritative cart, lines ordered newest first.
    async fn fetch_cart(&self) -> Result<CartSnapshot, BackendError>;

    async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<(), BackendError>;

    /// Quantity zero or less deletes the line.
    async fn update_cart_item(&self, line_id: &str, quantity: i64) -> Result<(), BackendError>;

    async fn remove_from_cart(&self, line_id: &str) -> Result<(), BackendError>;
}

#[async_trait]
pub trait LikesBackend: Send + Sync {
    async fn fetch_likes(&self) -> Result<LikesSnapshot, BackendError>;

    /// Flip the like; returns whether the product is now liked.
    async fn toggle_like(&self, product_id: &str) -> Result<bool, BackendError>;
}

#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Product>, BackendError>;

    async fn filter(&self, filters: &ProductFilters, limit: usize) -> Result<Vec<Product>, BackendError>;

    async fn product(&self, product_id: &str) -> Result<Option<Product>, BackendError>;

    /// Top-level categories in catalog order.
    async fn categories(&self) -> Result<Vec<Category>, BackendError>;

    /// Distinct brand names, sorted.
    async fn brands(&self) -> Result<Vec<String>, BackendError>;

    /// Curated picks for the home page, best first.
    async fn featured(&self, limit: usize) -> Result<Vec<Product>, BackendError>;
}

#[async_trait]
pub trait AccountBackend: Send + Sync {
    async fn permissions(&self) -> Result<Permissions, BackendError>;

    async fn update_profile(&self, name: &str) -> Result<(), BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Create a hosted payment session for the current cart; returns its URL.
    async fn create_checkout_session(&self) -> Result<String, BackendError>;
}
