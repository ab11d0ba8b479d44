use async_trait::async_trait;

use crate::bus::StoreEvent;
use crate::core::tool::ToolDescriptor;
use crate::runtime::notify::Notice;
use crate::tools::types::{required_str, StoreTool, ToolCallOutput, ToolContext, ToolError};

pub struct CartAddTool;

#[async_trait]
impl StoreTool for CartAddTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "cart.add".into(),
            description: "Add a product to the user's shopping cart by product id. Use when the user asks to add something to the cart.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "product_id": { "type": "string", "description": "Product id to add" },
                    "quantity": { "type": "integer", "description": "Quantity (default: 1)" }
                },
                "required": ["product_id"]
            }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": { "success": { "type": "boolean" } }
            })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let product_id = required_str(&input, "product_id")?;
        let quantity = input.get("quantity").and_then(|v| v.as_u64()).unwrap_or(1);
        if quantity == 0 {
            return Err(ToolError::InvalidInput("quantity must be at least 1".into()));
        }
        let quantity = u32::try_from(quantity)
            .map_err(|_| ToolError::InvalidInput(format!("quantity too large: {quantity}")))?;

        ctx.require_authenticated("add to cart").await?;
        ctx.cart.add_to_cart(product_id, quantity).await?;
        ctx.bus.publish(StoreEvent::Cart);
        ctx.notifier.notify(Notice::success("Product added to cart"));

        Ok(ToolCallOutput::success(serde_json::json!({ "success": true })))
    }
}

pub struct CartRemoveTool;

#[async_trait]
impl StoreTool for CartRemoveTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "cart.remove".into(),
            description: "Remove a line from the user's cart by cart item id.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "item_id": { "type": "string", "description": "Cart item id to remove" }
                },
                "required": ["item_id"]
            }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": { "success": { "type": "boolean" } }
            })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let item_id = required_str(&input, "item_id")?;

        ctx.require_authenticated("remove cart items").await?;
        ctx.cart.remove_from_cart(item_id).await?;
        ctx.bus.publish(StoreEvent::Cart);
        ctx.notifier.notify(Notice::success("Item removed from cart"));

        Ok(ToolCallOutput::success(serde_json::json!({ "success": true })))
    }
}

pub struct CartGetTool;

#[async_trait]
impl StoreTool for CartGetTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "cart.get".into(),
            description: "Get the user's current shopping cart with items and total.".into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            output_schema: None,
        }
    }

    async fn invoke(&self, ctx: &ToolContext, _input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let cart = ctx.cart.fetch_cart().await?;
        let lines: Vec<_> = cart.visible_lines().collect();
        Ok(ToolCallOutput::success(serde_json::json!({
            "items": lines,
            "total": cart.total,
            "item_count": cart.item_count(),
        })))
    }
}

pub struct LikesToggleTool;

#[async_trait]
impl StoreTool for LikesToggleTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "likes.toggle".into(),
            description: "Like or unlike a product for the user.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "product_id": { "type": "string", "description": "Product id" }
                },
                "required": ["product_id"]
            }),
            output_schema: Some(serde_json::json!({
                "type": "object",
                "properties": { "liked": { "type": "boolean" } }
            })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let product_id = required_str(&input, "product_id")?;

        ctx.require_authenticated("like products").await?;
        let liked = ctx.likes.toggle_like(product_id).await?;
        ctx.bus.publish(StoreEvent::Likes);
        ctx.notifier.notify(Notice::success(if liked {
            "Product liked"
        } else {
            "Product unliked"
        }));

        Ok(ToolCallOutput::success(serde_json::json!({ "liked": liked })))
    }
}

pub struct LikesGetTool;

#[async_trait]
impl StoreTool for LikesGetTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "likes.get".into(),
            description: "Get the ids of the products the user has liked.".into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            output_schema: Some(serde_json::json!({ "type": "array", "items": { "type": "string" } })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, _input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let likes = ctx.likes.fetch_likes().await?;
        Ok(ToolCallOutput::success(serde_json::to_value(&likes).unwrap_or_default()))
    }
}
