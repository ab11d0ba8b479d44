//! Catalog tools. Every catalog query needs a session; result lists meant for
//! browsing are mirrored to the products page through `product-search` events.

use async_trait::async_trait;

use crate::bus::StoreEvent;
use crate::core::product::{Product, ProductFilters};
use crate::core::tool::ToolDescriptor;
use crate::tools::types::{required_str, StoreTool, ToolCallOutput, ToolContext, ToolError};

const MAX_LIMIT: u64 = 100;
/// Default page size for filtered and per-category browsing.
pub const BROWSE_LIMIT: usize = 8;
pub const FEATURED_LIMIT: usize = 8;

fn limit_arg(input: &serde_json::Value, default: usize) -> usize {
    input
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|limit| limit.clamp(1, MAX_LIMIT) as usize)
        .unwrap_or(default)
}

/// Show `results` on the products page under `query` and return them.
fn publish_results(ctx: &ToolContext, query: impl Into<String>, results: Vec<Product>) -> ToolCallOutput {
    let data = serde_json::to_value(&results).unwrap_or_default();
    ctx.bus.publish(StoreEvent::product_search(query, results));
    ctx.show_products_page();
    ToolCallOutput::success(data)
}

/// Keyword search.
pub struct SearchProductsTool;

#[async_trait]
impl StoreTool for SearchProductsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "catalog.search".into(),
            description: concat!(
                "Search for products by keyword. Returns matching products with name, price and category. ",
                "Use when the user asks to find, search or look for products. ",
                "Results are also shown on the products page."
            )
            .into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search term" },
                    "limit": { "type": "integer", "description": "Max results (default: 20, max: 100)" }
                },
                "required": ["query"]
            }),
            output_schema: Some(serde_json::json!({ "type": "array" })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let query = required_str(&input, "query")?;
        let limit = limit_arg(&input, ctx.search_limit);

        ctx.require_authenticated("search products").await?;
        let results = ctx.catalog.search(query, limit).await?;
        Ok(publish_results(ctx, query, results))
    }
}

/// Structured filtering by category, brand, price and rating.
pub struct FilterProductsTool;

#[async_trait]
impl StoreTool for FilterProductsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "catalog.filter".into(),
            description: concat!(
                "Filter products by category, brands, price range, minimum rating and optional keyword. ",
                "Use for requests like 'laptops under $1000' or 'Apple headphones rated 4+'. ",
                "Results are also shown on the products page."
            )
            .into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "category": { "type": "string" },
                    "brands": { "type": "array", "items": { "type": "string" } },
                    "min_price": { "type": "number" },
                    "max_price": { "type": "number" },
                    "min_rating": { "type": "number" },
                    "search": { "type": "string" },
                    "limit": { "type": "integer", "description": "Max results (default: 8, max: 100)" }
                }
            }),
            output_schema: Some(serde_json::json!({ "type": "array" })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let limit = limit_arg(&input, BROWSE_LIMIT);
        let filters: ProductFilters = if input.is_null() {
            ProductFilters::default()
        } else {
            serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(format!("invalid filters: {e}")))?
        };

        if let (Some(min), Some(max)) = (filters.min_price, filters.max_price) {
            if min > max {
                return Err(ToolError::InvalidInput(format!(
                    "min_price {min} is greater than max_price {max}"
                )));
            }
        }

        ctx.require_authenticated("browse products").await?;
        let results = ctx.catalog.filter(&filters, limit).await?;
        Ok(publish_results(ctx, filters.label(), results))
    }
}

/// Single product lookup by id.
pub struct ProductLookupTool;

#[async_trait]
impl StoreTool for ProductLookupTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "catalog.product".into(),
            description: "Get full details for one product by its id.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "product_id": { "type": "string", "description": "Product id" }
                },
                "required": ["product_id"]
            }),
            output_schema: None,
        }
    }

    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let product_id = required_str(&input, "product_id")?;

        ctx.require_authenticated("view products").await?;
        match ctx.catalog.product(product_id).await? {
            Some(product) => Ok(ToolCallOutput::success(serde_json::to_value(&product).unwrap_or_default())),
            None => Err(ToolError::InvalidInput(format!("unknown product: {product_id}"))),
        }
    }
}

pub struct CategoriesTool;

#[async_trait]
impl StoreTool for CategoriesTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "catalog.categories".into(),
            description: "List all product categories. Use when the user wants to browse or see categories.".into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            output_schema: Some(serde_json::json!({ "type": "array" })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, _input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        ctx.require_authenticated("browse categories").await?;
        let categories = ctx.catalog.categories().await?;
        Ok(ToolCallOutput::success(
            serde_json::to_value(&categories).unwrap_or_default(),
        ))
    }
}

pub struct BrandsTool;

#[async_trait]
impl StoreTool for BrandsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "catalog.brands".into(),
            description: "List all available product brands.".into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            output_schema: Some(serde_json::json!({ "type": "array", "items": { "type": "string" } })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, _input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        ctx.require_authenticated("browse brands").await?;
        let brands = ctx.catalog.brands().await?;
        Ok(ToolCallOutput::success(serde_json::json!(brands)))
    }
}

pub struct FeaturedProductsTool;

#[async_trait]
impl StoreTool for FeaturedProductsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "catalog.featured".into(),
            description: "Get curated featured products. Use when the user asks for the best, popular or featured products."
                .into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
            output_schema: Some(serde_json::json!({ "type": "array" })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, _input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        ctx.require_authenticated("view featured products").await?;
        let featured = ctx.catalog.featured(FEATURED_LIMIT).await?;
        Ok(ToolCallOutput::success(
            serde_json::to_value(&featured).unwrap_or_default(),
        ))
    }
}

/// Browse one category on the products page.
pub struct CategoryProductsTool;

#[async_trait]
impl StoreTool for CategoryProductsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "catalog.by_category".into(),
            description: "Get products from a specific category. Results are also shown on the products page.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "category": { "type": "string", "description": "Category name" },
                    "limit": { "type": "integer", "description": "Max results (default: 8, max: 100)" }
                },
                "required": ["category"]
            }),
            output_schema: Some(serde_json::json!({ "type": "array" })),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError> {
        let category = required_str(&input, "category")?;
        let limit = limit_arg(&input, BROWSE_LIMIT);

        ctx.require_authenticated("browse products").await?;
        let filters = ProductFilters {
            category: Some(category.to_string()),
            ..ProductFilters::default()
        };
        let results = ctx.catalog.filter(&filters, limit).await?;
        Ok(publish_results(ctx, format!("Category: {category}"), results))
    }
}
