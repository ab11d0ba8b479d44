//! Cart snapshot and the pure optimistic transitions applied to it.
//!
//! Every transition builds a new [`CartSnapshot`]; nothing here mutates a
//! snapshot that may already be shared with readers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::Product;

/// Prefix for line ids synthesized before the server assigns a real one.
pub const TEMP_LINE_PREFIX: &str = "temp-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub product_id: String,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
    /// `None` when the referenced product could not be resolved.
    pub product: Option<Product>,
}

impl CartLine {
    pub fn is_optimistic(&self) -> bool {
        self.id.starts_with(TEMP_LINE_PREFIX)
    }

    fn subtotal(&self) -> f64 {
        self.product
            .as_ref()
            .map(|product| product.price * f64::from(self.quantity))
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartLine>,
    pub total: f64,
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl CartSnapshot {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0.0,
        }
    }

    /// Build a snapshot from lines, deriving `total` from them.
    pub fn from_lines(items: Vec<CartLine>) -> Self {
        let total = compute_total(&items);
        Self { items, total }
    }

    /// Lines that can be displayed (product resolved).
    pub fn visible_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.items.iter().filter(|line| line.product.is_some())
    }

    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.items.iter().find(|line| line.id == line_id)
    }

    pub fn line_for_product(&self, product_id: &str) -> Option<&CartLine> {
        self.items.iter().find(|line| line.product_id == product_id)
    }

    /// Total number of units across resolved lines.
    pub fn item_count(&self) -> u32 {
        self.visible_lines().map(|line| line.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Sum of `price × quantity` over lines whose product resolved.
pub fn compute_total(items: &[CartLine]) -> f64 {
    items.iter().map(CartLine::subtotal).sum()
}

/// A requested cart change, applied optimistically and then committed.
#[derive(Debug, Clone, PartialEq)]
pub enum CartIntent {
    /// Add `quantity` units of `product`, merging into an existing line.
    Add { product: Product, quantity: u32 },
    /// Set a line's quantity; zero or less removes the line.
    SetQuantity { line_id: String, quantity: i64 },
    Remove { line_id: String },
}

impl CartIntent {
    pub fn add(product: Product, quantity: u32) -> Self {
        Self::Add { product, quantity }
    }

    pub fn set_quantity(line_id: impl Into<String>, quantity: i64) -> Self {
        Self::SetQuantity {
            line_id: line_id.into(),
            quantity,
        }
    }

    pub fn remove(line_id: impl Into<String>) -> Self {
        Self::Remove {
            line_id: line_id.into(),
        }
    }

    /// Produce the snapshot the user should see if this intent succeeds.
    pub fn apply(&self, current: &CartSnapshot, now: DateTime<Utc>) -> CartSnapshot {
        match self {
            Self::Add { product, quantity } => add_line(current, product, *quantity, now),
            Self::SetQuantity { line_id, quantity } => {
                if *quantity <= 0 {
                    remove_line(current, line_id)
                } else {
                    let quantity = u32::try_from(*quantity).unwrap_or(u32::MAX);
                    set_line_quantity(current, line_id, quantity)
                }
            }
            Self::Remove { line_id } => remove_line(current, line_id),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add to cart",
            Self::SetQuantity { .. } => "update cart item",
            Self::Remove { .. } => "remove from cart",
        }
    }
}

fn add_line(current: &CartSnapshot, product: &Product, quantity: u32, now: DateTime<Utc>) -> CartSnapshot {
    let quantity = quantity.max(1);
    let mut items = current.items.clone();

    if let Some(existing) = items.iter_mut().find(|line| line.product_id == product.id) {
        existing.quantity = existing.quantity.saturating_add(quantity);
    } else {
        items.insert(
            0,
            CartLine {
                id: format!("{TEMP_LINE_PREFIX}{}", Uuid::new_v4()),
                product_id: product.id.clone(),
                quantity,
                added_at: now,
                product: Some(product.clone()),
            },
        );
    }

    CartSnapshot::from_lines(items)
}

fn set_line_quantity(current: &CartSnapshot, line_id: &str, quantity: u32) -> CartSnapshot {
    let items = current
        .items
        .iter()
        .map(|line| {
            if line.id == line_id {
                CartLine {
                    quantity,
                    ..line.clone()
                }
            } else {
                line.clone()
            }
        })
        .collect();
    CartSnapshot::from_lines(items)
}

fn remove_line(current: &CartSnapshot, line_id: &str) -> CartSnapshot {
    let items = current
        .items
        .iter()
        .filter(|line| line.id != line_id)
        .cloned()
        .collect();
    CartSnapshot::from_lines(items)
}
