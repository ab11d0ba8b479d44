//! Visual guidance tools: single-element highlights and onboarding tours.

use async_trait::async_trait;

use crate::bus::{HighlightPayload, StoreEvent, TourStep};
use crate::core::tool::ToolDescriptor;
use crate::tools::types::{optional_str, required_str, StoreTool, ToolCallOutput, ToolContext, ToolError};

/// How long an assistant-requested highlight stays up.
pub const TOOL_HIGHLIGHT_DURATION_MS: u64 = 3500;

/// Element ids the page tags with `data-highlight`.
pub const HIGHLIGHT_ELEMENTS: &[&str] = &[
    "logo",
    "nav-home",
    "nav-products",
    "nav-categories",
    "nav-deals",
    "search-button",
    "cart-button",
    "user-menu",
    "sign-in-button",
    "hero-section",
    "shop-now-button",
    "featured-products",
    "categories-section",
    "newsletter-section",
    "newsletter-form",
    "cta-section",
    "footer",
    "products-page",
    "cart-page",
    "settings-page",
    "dashboard-page",
];

const HOME_TOUR: &[(&str, &str)] = &[
    ("logo", "Store logo - click to return home"),
    ("nav-products", "Browse all products here"),
    ("search-button", "Search for any product instantly"),
    ("cart-button", "View your shopping cart"),
    ("featured-products", "Check out our featured products"),
    ("categories-section", "Browse products by category"),
    ("newsletter-section", "Subscribe for exclusive tech updates"),
];

const PRODUCTS_TOUR: &[(&str, &str)] = &[
    ("search-button", "Search for specific products"),
    ("products-page", "Browse and filter the full catalog"),
    ("cart-button", "Items you add will appear here"),
];

const CART_TOUR: &[(&str, &str)] = &[
    ("cart-page", "Review items in your cart"),
    ("nav-products", "Continue shopping here"),
];

const SETTINGS_TOUR: &[(&str, &str)] = &[
    ("settings-page", "Update your profile information"),
    ("nav-products", "Browse products"),
    ("cart-button", "View your cart"),
];

const DEFAULT_TOUR: &[(&str, &str)] = &[
    ("logo", "Click the logo to go home"),
    ("nav-products", "Browse all products"),
    ("search-button", "Search for products"),
    ("cart-button", "Your shopping cart"),
];

/// Pages with a dedicated onboarding tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourPage {
    Home,
    Products,
    Cart,
    Settings,
    Default,
}

impl TourPage {
    pub fn from_path(path: &str) -> Self {
        match path {
            "/" => Self::Home,
            "/products" => Self::Products,
            "/cart" => Self::Cart,
            "/settings" => Self::Settings,
            _ => Self::Default,
        }
    }

    /// Unknown names fall back to the default tour.
    pub fn from_name(name: &str) -> Self {
        match name {
            "home" => Self::Home,
            "products" => Self::Products,
            "cart" => Self::Cart,
            "settings" => Self::Settings,
            _ => Self::Default,
        }
    }

    pub fn steps(&self) -> Vec<TourStep> {
        let table = match self {
            Self::Home => HOME_TOUR,
            Self::Products => PRODUCTS_TOUR,
            Self::Cart => CART_TOUR,
            Self::Settings => SETTINGS_TOUR,
            Self::Default => DEFAULT_TOUR,
        };
        table
            .iter()
            .map(|(element_id, label)| TourStep::new(*element_id, *label))
            .collect()
    }
}

pub struct HighlightTool;

#[async_trait]
impl StoreTool for HighlightTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "ui.highlight".into(),
            description: concat!(
                "Highlight a UI element on the page to show the user where it is. ",
                "The element is outlined for a few seconds and scrolled into view. ",
                "Use when the user asks where something is or needs visual guidance. ",
                "Always provide a helpful label describing what the element does."
            )
            .into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "element_id": {
                        "type": "string",
                        "enum": HIGHLIGHT_ELEMENTS,
                        "description": "The identifier of the UI element to highlight"
                    },
                    "label": {
                        "type": "string",
                        "description": "Short tooltip shown near the element, e.g. 'Click here to view your cart'"
                    }
                },
                "required": ["element_id"]
            }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": { "highlighted": { "type": "string" } }
            })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let element_id = required_str(&input, "element_id")?;
        if !HIGHLIGHT_ELEMENTS.contains(&element_id) {
            return Err(ToolError::InvalidInput(format!("unknown element: {element_id}")));
        }
        let label = optional_str(&input, "label")
            .map(str::to_string)
            .unwrap_or_else(|| element_id.replace('-', " "));

        ctx.bus.publish(StoreEvent::highlight(HighlightPayload::single(
            element_id,
            label,
            Some(TOOL_HIGHLIGHT_DURATION_MS),
        )));

        Ok(ToolCallOutput::success(serde_json::json!({ "highlighted": element_id })))
    }
}

pub struct OnboardingTool;

#[async_trait]
impl StoreTool for OnboardingTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "ui.onboarding".into(),
            description: concat!(
                "Start an interactive onboarding tour that highlights key UI elements one by one. ",
                "Use when the user asks for help getting started, wants a tour, or says 'show me around'."
            )
            .into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "page": {
                        "type": "string",
                        "enum": ["home", "products", "cart", "settings", "default"],
                        "description": "Which page's tour to run. Defaults to the current page."
                    }
                }
            }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" },
                    "steps": { "type": "array", "items": { "type": "string" } }
                }
            })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let page = match optional_str(&input, "page") {
            Some(name) => TourPage::from_name(name),
            None => ctx
                .navigator
                .current_path()
                .map(|path| TourPage::from_path(&path))
                .unwrap_or(TourPage::Default),
        };

        let steps = page.steps();
        let labels: Vec<String> = steps.iter().map(|step| step.label.clone()).collect();
        let message = format!("Starting onboarding tour with {} steps", steps.len());

        ctx.bus
            .publish(StoreEvent::highlight(HighlightPayload::tour(steps)));

        Ok(ToolCallOutput::success(serde_json::json!({
            "message": message,
            "steps": labels,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tour_page_follows_current_path() {
        assert_eq!(TourPage::from_path("/"), TourPage::Home);
        assert_eq!(TourPage::from_path("/cart"), TourPage::Cart);
        assert_eq!(TourPage::from_path("/products/p-1"), TourPage::Default);
        assert_eq!(TourPage::from_name("nope"), TourPage::Default);
    }

    #[test]
    fn every_tour_step_targets_a_known_element() {
        for page in [
            TourPage::Home,
            TourPage::Products,
            TourPage::Cart,
            TourPage::Settings,
            TourPage::Default,
        ] {
            for step in page.steps() {
                assert!(
                    HIGHLIGHT_ELEMENTS.contains(&step.element_id.as_str()),
                    "{} is not highlightable",
                    step.element_id
                );
            }
        }
        assert_eq!(TourPage::Home.steps().len(), 7);
    }
}
