//! In-process storefront backend.
//!
//! Backs the replay binary and the integration tests with a product catalog,
//! a single session's cart and likes, and a toggleable permission set.
//! Keyword search is fuzzy, ranked with `nucleo-matcher`.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use uuid::Uuid;

use crate::core::backend::{AccountBackend, BackendError, CartBackend, CatalogBackend, LikesBackend, Permissions};
use crate::core::cart::{CartLine, CartSnapshot};
use crate::core::likes::LikesSnapshot;
use crate::core::product::{Category, Product, ProductFilters};

pub const DEFAULT_CHECKOUT_BASE: &str = "https://checkout.local/session";

#[derive(Debug, Default)]
struct StoreState {
    lines: Vec<CartLine>,
    likes: BTreeSet<String>,
    permissions: Permissions,
    profile_name: Option<String>,
    next_line: u64,
    unavailable: bool,
}

pub struct InMemoryStore {
    catalog: Vec<Product>,
    checkout_base: String,
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// A store over `catalog` with a signed-in, non-admin session.
    pub fn new(catalog: Vec<Product>) -> Self {
        Self {
            catalog,
            checkout_base: DEFAULT_CHECKOUT_BASE.to_string(),
            state: Mutex::new(StoreState {
                permissions: Permissions {
                    authenticated: true,
                    is_admin: false,
                },
                ..StoreState::default()
            }),
        }
    }

    pub fn with_checkout_base(mut self, base: impl Into<String>) -> Self {
        self.checkout_base = base.into();
        self
    }

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    pub fn set_permissions(&self, permissions: Permissions) {
        self.lock().permissions = permissions;
    }

    /// While set, every call fails with a transport error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    pub fn profile_name(&self) -> Option<String> {
        self.lock().profile_name.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("store mutex poisoned")
    }

    fn find(&self, product_id: &str) -> Option<&Product> {
        self.catalog.iter().find(|product| product.id == product_id)
    }

    /// Lock the session state after the availability check.
    fn session(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, BackendError> {
        let state = self.lock();
        if state.unavailable {
            return Err(BackendError::Transport("store unavailable".into()));
        }
        Ok(state)
    }

    fn signed_in(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, BackendError> {
        let state = self.session()?;
        if !state.permissions.authenticated {
            return Err(BackendError::Unauthorized);
        }
        Ok(state)
    }

    /// Fuzzy-rank `candidates` against `query`; best score first, then name.
    fn rank<'a>(query: &str, candidates: impl Iterator<Item = &'a Product>) -> Vec<&'a Product> {
        let pattern = Pattern::new(query, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy);
        let mut matcher = Matcher::new(Config::DEFAULT);
        let mut utf32_buf = Vec::new();

        let mut scored: Vec<(u32, &Product)> = candidates
            .filter_map(|product| {
                let text = format!(
                    "{} {} {} {}",
                    product.name, product.brand, product.category, product.description
                );
                let haystack = Utf32Str::new(&text, &mut utf32_buf);
                let score = pattern.score(haystack, &mut matcher)?;
                Some((score, product))
            })
            .collect();

        scored.sort_by(|a, b| match b.0.cmp(&a.0) {
            std::cmp::Ordering::Equal => a.1.name.cmp(&b.1.name),
            other => other,
        });
        scored.into_iter().map(|(_, product)| product).collect()
    }
}

#[async_trait]
impl CartBackend for InMemoryStore {
    async fn fetch_cart(&self) -> Result<CartSnapshot, BackendError> {
        let state = self.session()?;
        if !state.permissions.authenticated {
            return Ok(CartSnapshot::empty());
        }
        Ok(CartSnapshot::from_lines(state.lines.clone()))
    }

    async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<(), BackendError> {
        let product = self
            .find(product_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("product {product_id}")))?;
        let mut state = self.signed_in()?;
        let quantity = quantity.max(1);

        if let Some(line) = state.lines.iter_mut().find(|line| line.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return Ok(());
        }

        state.next_line += 1;
        let line = CartLine {
            id: format!("line-{}", state.next_line),
            product_id: product_id.to_string(),
            quantity,
            added_at: Utc::now(),
            product: Some(product),
        };
        state.lines.insert(0, line);
        Ok(())
    }

    async fn update_cart_item(&self, line_id: &str, quantity: i64) -> Result<(), BackendError> {
        let mut state = self.signed_in()?;
        let index = state
            .lines
            .iter()
            .position(|line| line.id == line_id)
            .ok_or_else(|| BackendError::NotFound(format!("cart line {line_id}")))?;

        if quantity <= 0 {
            state.lines.remove(index);
        } else {
            state.lines[index].quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        Ok(())
    }

    async fn remove_from_cart(&self, line_id: &str) -> Result<(), BackendError> {
        let mut state = self.signed_in()?;
        let before = state.lines.len();
        state.lines.retain(|line| line.id != line_id);
        if state.lines.len() == before {
            return Err(BackendError::NotFound(format!("cart line {line_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl LikesBackend for InMemoryStore {
    async fn fetch_likes(&self) -> Result<LikesSnapshot, BackendError> {
        let state = self.session()?;
        if !state.permissions.authenticated {
            return Ok(LikesSnapshot::default());
        }
        Ok(LikesSnapshot::new(state.likes.iter().cloned()))
    }

    async fn toggle_like(&self, product_id: &str) -> Result<bool, BackendError> {
        if self.find(product_id).is_none() {
            return Err(BackendError::NotFound(format!("product {product_id}")));
        }
        let mut state = self.signed_in()?;
        if state.likes.remove(product_id) {
            Ok(false)
        } else {
            state.likes.insert(product_id.to_string());
            Ok(true)
        }
    }
}

#[async_trait]
impl CatalogBackend for InMemoryStore {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Product>, BackendError> {
        drop(self.session()?);
        let query = query.trim();
        let mut results: Vec<Product> = if query.is_empty() {
            self.catalog.iter().cloned().collect()
        } else {
            Self::rank(query, self.catalog.iter()).into_iter().cloned().collect()
        };
        results.truncate(limit);
        Ok(results)
    }

    async fn filter(&self, filters: &ProductFilters, limit: usize) -> Result<Vec<Product>, BackendError> {
        drop(self.session()?);
        let admitted = self.catalog.iter().filter(|product| filters.admits(product));
        let mut results: Vec<Product> = match filters.search.as_deref().map(str::trim) {
            Some(search) if !search.is_empty() => Self::rank(search, admitted).into_iter().cloned().collect(),
            _ => admitted.cloned().collect(),
        };
        results.truncate(limit);
        Ok(results)
    }

    async fn product(&self, product_id: &str) -> Result<Option<Product>, BackendError> {
        drop(self.session()?);
        Ok(self.find(product_id).cloned())
    }

    async fn categories(&self) -> Result<Vec<Category>, BackendError> {
        drop(self.session()?);
        let mut categories: Vec<Category> = Vec::new();
        for product in self.catalog.iter().filter(|p| !p.category.is_empty()) {
            match categories.iter_mut().find(|c| c.name == product.category) {
                Some(category) => category.product_count += 1,
                None => categories.push(Category {
                    name: product.category.clone(),
                    image: product.image.clone(),
                    product_count: 1,
                }),
            }
        }
        Ok(categories)
    }

    async fn brands(&self) -> Result<Vec<String>, BackendError> {
        drop(self.session()?);
        let brands: BTreeSet<&str> = self
            .catalog
            .iter()
            .map(|product| product.brand.as_str())
            .filter(|brand| !brand.is_empty())
            .collect();
        Ok(brands.into_iter().map(str::to_string).collect())
    }

    /// Highest rated first; unrated products trail, ties by name.
    async fn featured(&self, limit: usize) -> Result<Vec<Product>, BackendError> {
        drop(self.session()?);
        let mut ranked: Vec<&Product> = self.catalog.iter().collect();
        ranked.sort_by(|a, b| {
            let by_rating = b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0));
            by_rating.then_with(|| a.name.cmp(&b.name))
        });
        Ok(ranked.into_iter().take(limit).cloned().collect())
    }
}

#[async_trait]
impl AccountBackend for InMemoryStore {
    async fn permissions(&self) -> Result<Permissions, BackendError> {
        Ok(self.session()?.permissions)
    }

    async fn update_profile(&self, name: &str) -> Result<(), BackendError> {
        let mut state = self.signed_in()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(BackendError::Rejected("name must not be empty".into()));
        }
        state.profile_name = Some(name.to_string());
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let mut state = self.signed_in()?;
        state.permissions = Permissions::default();
        Ok(())
    }

    async fn create_checkout_session(&self) -> Result<String, BackendError> {
        let state = self.signed_in()?;
        if state.lines.is_empty() {
            return Err(BackendError::Rejected("cart is empty".into()));
        }
        Ok(format!("{}/{}", self.checkout_base, Uuid::new_v4()))
    }
}
