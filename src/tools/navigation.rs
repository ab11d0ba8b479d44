//! Navigation, checkout and account tools.

use std::str::FromStr;

use async_trait::async_trait;

use crate::bus::StoreEvent;
use crate::core::tool::ToolDescriptor;
use crate::runtime::notify::Notice;
use crate::tools::types::{optional_str, required_str, StoreTool, ToolCallOutput, ToolContext, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Products,
    ProductDetail,
    Cart,
    Settings,
    SignIn,
    SignUp,
    AdminDashboard,
    CheckoutSuccess,
}

impl Page {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Products => "products",
            Self::ProductDetail => "product-detail",
            Self::Cart => "cart",
            Self::Settings => "settings",
            Self::SignIn => "sign-in",
            Self::SignUp => "sign-up",
            Self::AdminDashboard => "admin-dashboard",
            Self::CheckoutSuccess => "checkout-success",
        }
    }

    pub const fn all() -> &'static [Page] {
        &[
            Page::Home,
            Page::Products,
            Page::ProductDetail,
            Page::Cart,
            Page::Settings,
            Page::SignIn,
            Page::SignUp,
            Page::AdminDashboard,
            Page::CheckoutSuccess,
        ]
    }

    /// Pages reachable without signing in.
    pub const fn is_public(&self) -> bool {
        matches!(
            self,
            Self::Home | Self::Products | Self::ProductDetail | Self::SignIn | Self::SignUp
        )
    }

    pub const fn requires_admin(&self) -> bool {
        matches!(self, Self::AdminDashboard)
    }

    /// In-app path; product detail needs the product id.
    pub fn path(&self, product_id: Option<&str>) -> Result<String, ToolError> {
        let path = match self {
            Self::Home => "/",
            Self::Products => "/products",
            Self::Cart => "/cart",
            Self::Settings => "/settings",
            Self::SignIn => "/sign-in",
            Self::SignUp => "/sign-up",
            Self::AdminDashboard => "/admin/dashboard",
            Self::CheckoutSuccess => "/checkout/success",
            Self::ProductDetail => {
                let product_id = product_id
                    .ok_or_else(|| ToolError::InvalidInput("product_id required for product-detail".into()))?;
                return Ok(format!("/products/{}", urlencoding::encode(product_id)));
            }
        };
        Ok(path.to_string())
    }
}

impl FromStr for Page {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Page::all()
            .iter()
            .copied()
            .find(|page| page.as_str() == normalized)
            .ok_or_else(|| ToolError::InvalidInput(format!("unknown page: {value}")))
    }
}

pub struct NavigateTool;

#[async_trait]
impl StoreTool for NavigateTool {
    fn descriptor(&self) -> ToolDescriptor {
        let pages: Vec<&str> = Page::all().iter().map(Page::as_str).collect();
        ToolDescriptor {
            name: "nav.goto".into(),
            description: concat!(
                "Navigate the user to a page in the app. Use when the user asks to go to, open, or be taken to a page. ",
                "For product detail pages pass the product id. The admin dashboard is only available to admins."
            )
            .into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "page": { "type": "string", "enum": pages, "description": "Target page" },
                    "product_id": { "type": "string", "description": "Product id for product-detail" }
                },
                "required": ["page"]
            }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": { "navigated_to": { "type": "string" } }
            })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let page: Page = required_str(&input, "page")?.parse()?;
        let path = page.path(optional_str(&input, "product_id"))?;

        if !page.is_public() {
            let permissions = ctx.require_authenticated("open this page").await?;
            if page.requires_admin() && !permissions.is_admin {
                ctx.notifier
                    .notify(Notice::error("Sorry, you're not allowed to access admin features"));
                return Err(ToolError::Forbidden(format!("{} is restricted to admins", page.as_str())));
            }
        }

        ctx.bus.publish(StoreEvent::navigation(path.clone()));
        ctx.notifier
            .notify(Notice::info(format!("Navigating to {}", page.as_str().replace('-', " "))));

        Ok(ToolCallOutput::success(serde_json::json!({ "navigated_to": path })))
    }
}

pub struct CheckoutTool;

#[async_trait]
impl StoreTool for CheckoutTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "checkout.start".into(),
            description: concat!(
                "Start checkout for the user's cart and redirect to the hosted payment page. ",
                "Use when the user says checkout, pay, buy, purchase or complete order."
            )
            .into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": { "checkout_url": { "type": "string" } }
            })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, _input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        ctx.require_authenticated("checkout").await?;

        let url = match ctx.account.create_checkout_session().await {
            Ok(url) => url,
            Err(e) => {
                ctx.notifier.notify(Notice::error("Checkout failed. Please try again."));
                return Err(e.into());
            }
        };

        ctx.notifier.notify(Notice::info("Redirecting to checkout..."));
        ctx.bus.publish(StoreEvent::checkout(url.clone()));

        Ok(ToolCallOutput::success(serde_json::json!({ "checkout_url": url })))
    }
}

pub struct ProfileUpdateTool;

#[async_trait]
impl StoreTool for ProfileUpdateTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "profile.update".into(),
            description: "Update the user's display name. Use when the user asks to change their name or profile.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "New display name" }
                },
                "required": ["name"]
            }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": { "updated_name": { "type": "string" } }
            })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let name = required_str(&input, "name")?;

        if let Err(e) = ctx.account.update_profile(name).await {
            ctx.notifier.notify(Notice::error("Failed to update profile"));
            return Err(e.into());
        }

        ctx.bus.publish(StoreEvent::profile(Some(name.to_string())));
        ctx.notifier
            .notify(Notice::success(format!("Name updated to \"{name}\"")));

        Ok(ToolCallOutput::success(serde_json::json!({ "updated_name": name })))
    }
}

pub struct SignOutTool;

#[async_trait]
impl StoreTool for SignOutTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "session.sign_out".into(),
            description: "Sign the current user out. Use when the user asks to sign out or log out.".into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            output_schema: None,
        }
    }

    async fn invoke(&self, ctx: &ToolContext, _input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        if let Err(e) = ctx.account.sign_out().await {
            ctx.notifier.notify(Notice::error("Failed to sign out"));
            return Err(e.into());
        }

        ctx.notifier.notify(Notice::success("Signed out successfully"));
        ctx.bus.publish(StoreEvent::navigation("/"));

        Ok(ToolCallOutput::success(serde_json::json!({ "success": true })))
    }
}
