//! Shared domain types: products, cart and likes snapshots, the server
//! collaborator traits, and tool descriptors.

pub mod backend;
pub mod cart;
pub mod likes;
pub mod product;
pub mod tool;

pub use backend::{AccountBackend, BackendError, CartBackend, CatalogBackend, LikesBackend, Permissions};
pub use cart::{CartIntent, CartLine, CartSnapshot};
pub use likes::{LikesIntent, LikesSnapshot};
pub use product::{Category, Product, ProductFilters};
