//! Store event kinds and their payloads.
//!
//! Single source of truth for what may travel on the bus. Each kind carries
//! its own typed payload; consumers match on [`StoreEvent`] instead of
//! probing loosely shaped maps.

use serde::{Deserialize, Serialize};

use crate::core::product::Product;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreEventKind {
    Cart,
    Likes,
    Profile,
    Navigation,
    Checkout,
    ProductSearch,
    Highlight,
}

impl StoreEventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Likes => "likes",
            Self::Profile => "profile",
            Self::Navigation => "navigation",
            Self::Checkout => "checkout",
            Self::ProductSearch => "product-search",
            Self::Highlight => "highlight",
        }
    }
}

impl std::fmt::Display for StoreEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationPayload {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutPayload {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSearchPayload {
    pub query: String,
    #[serde(default)]
    pub results: Vec<Product>,
}

/// One stop of an onboarding tour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourStep {
    pub element_id: String,
    pub label: String,
    #[serde(default, alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl TourStep {
    pub fn new(element_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            label: label.into(),
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, alias = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<TourStep>,
}

/// What a highlight payload asks the sequencer to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightRequest {
    Single {
        element_id: String,
        label: String,
        duration_ms: Option<u64>,
    },
    Tour(Vec<TourStep>),
}

impl HighlightPayload {
    pub fn single(element_id: impl Into<String>, label: impl Into<String>, duration_ms: Option<u64>) -> Self {
        Self {
            element_id: Some(element_id.into()),
            label: Some(label.into()),
            duration_ms,
            steps: Vec::new(),
        }
    }

    pub fn tour(steps: Vec<TourStep>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Non-empty `steps` win over `element_id`; a payload with neither is
    /// ignored.
    pub fn request(&self) -> Option<HighlightRequest> {
        if !self.steps.is_empty() {
            return Some(HighlightRequest::Tour(self.steps.clone()));
        }
        let element_id = self.element_id.as_deref()?.trim();
        if element_id.is_empty() {
            return None;
        }
        Some(HighlightRequest::Single {
            element_id: element_id.to_string(),
            label: self.label.clone().unwrap_or_default(),
            duration_ms: self.duration_ms,
        })
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum StoreEvent {
    /// Cart changed server-side; refetch.
    Cart,
    /// Likes changed server-side; refetch.
    Likes,
    Profile(ProfilePayload),
    Navigation(NavigationPayload),
    Checkout(CheckoutPayload),
    ProductSearch(ProductSearchPayload),
    Highlight(HighlightPayload),
}

impl StoreEvent {
    pub fn kind(&self) -> StoreEventKind {
        match self {
            Self::Cart => StoreEventKind::Cart,
            Self::Likes => StoreEventKind::Likes,
            Self::Profile(_) => StoreEventKind::Profile,
            Self::Navigation(_) => StoreEventKind::Navigation,
            Self::Checkout(_) => StoreEventKind::Checkout,
            Self::ProductSearch(_) => StoreEventKind::ProductSearch,
            Self::Highlight(_) => StoreEventKind::Highlight,
        }
    }

    pub fn navigation(path: impl Into<String>) -> Self {
        Self::Navigation(NavigationPayload { path: path.into() })
    }

    pub fn checkout(url: impl Into<String>) -> Self {
        Self::Checkout(CheckoutPayload { url: url.into() })
    }

    pub fn profile(name: Option<String>) -> Self {
        Self::Profile(ProfilePayload { name })
    }

    pub fn product_search(query: impl Into<String>, results: Vec<Product>) -> Self {
        Self::ProductSearch(ProductSearchPayload {
            query: query.into(),
            results,
        })
    }

    pub fn highlight(payload: HighlightPayload) -> Self {
        Self::Highlight(payload)
    }
}
