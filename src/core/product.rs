use serde::{Deserialize, Serialize};

/// Catalog product as seen by the sync layer.
///
/// Only the fields the cart total, the search banner and the tools need are
/// modelled; anything else the catalog carries is ignored on deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            brand: String::new(),
            category: String::new(),
            price,
            image: None,
            rating: None,
        }
    }
}

/// Catalog filter accepted by `catalog.filter` and [`crate::core::backend::CatalogBackend`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilters {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_rating: Option<f32>,
    #[serde(default)]
    pub search: Option<String>,
}

impl ProductFilters {
    /// Whether `product` passes every structured constraint. `search` is
    /// left to the backend's own matcher.
    pub fn admits(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if !self.brands.is_empty()
            && !self
                .brands
                .iter()
                .any(|brand| brand.eq_ignore_ascii_case(&product.brand))
        {
            return false;
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        if let Some(min_rating) = self.min_rating {
            if product.rating.unwrap_or(0.0) < min_rating {
                return false;
            }
        }
        true
    }

    /// Banner query for filtered results, e.g. `Category: audio | Price: 0-100`.
    pub fn label(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            parts.push(format!("Search: {search}"));
        }
        if let Some(category) = &self.category {
            parts.push(format!("Category: {category}"));
        }
        if !self.brands.is_empty() {
            parts.push(format!("Brand: {}", self.brands.join(", ")));
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            let min = self.min_price.unwrap_or(0.0);
            let max = self
                .max_price
                .map(|max| max.to_string())
                .unwrap_or_else(|| "max".to_string());
            parts.push(format!("Price: {min}-{max}"));
        }
        if let Some(rating) = self.min_rating {
            parts.push(format!("Rating: {rating}+"));
        }
        if parts.is_empty() {
            "Filtered products".to_string()
        } else {
            parts.join(" | ")
        }
    }
}

/// A top-level catalog category with a representative image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub product_count: usize,
}
