use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Set of liked product ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LikesSnapshot {
    product_ids: BTreeSet<String>,
}

impl LikesSnapshot {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            product_ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.product_ids.contains(product_id)
    }

    pub fn len(&self) -> usize {
        self.product_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product_ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.product_ids.iter().map(String::as_str)
    }

    /// New snapshot with `product_id` flipped.
    pub fn toggled(&self, product_id: &str) -> Self {
        let mut product_ids = self.product_ids.clone();
        if !product_ids.remove(product_id) {
            product_ids.insert(product_id.to_string());
        }
        Self { product_ids }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikesIntent {
    Toggle { product_id: String },
}

impl LikesIntent {
    pub fn toggle(product_id: impl Into<String>) -> Self {
        Self::Toggle {
            product_id: product_id.into(),
        }
    }

    pub fn apply(&self, current: &LikesSnapshot) -> LikesSnapshot {
        match self {
            Self::Toggle { product_id } => current.toggled(product_id),
        }
    }
}
