//! Optimistic caches for server-backed collections.
//!
//! - `optimistic`: the generic read / invalidate / mutate cache
//! - `cart`, `likes`: the two resources the storefront keeps client-side

pub mod cart;
pub mod likes;
pub mod optimistic;

pub use cart::{CartCache, CartResource};
pub use likes::{LikesCache, LikesResource};
pub use optimistic::{CacheError, CacheStatus, CacheView, OptimisticCache, Resource};
