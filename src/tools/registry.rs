//! Tool registry for dynamic tool discovery and invocation.
//!
//! The ToolRegistry holds every assistant-callable storefront tool, keyed by
//! its descriptor name. Tools are invoked with a shared `ToolContext`.

use std::collections::HashMap;

use crate::core::tool::ToolDescriptor;
use crate::tools::cart::{CartAddTool, CartGetTool, CartRemoveTool, LikesGetTool, LikesToggleTool};
use crate::tools::catalog::{
    BrandsTool, CategoriesTool, CategoryProductsTool, FeaturedProductsTool, FilterProductsTool, ProductLookupTool,
    SearchProductsTool,
};
use crate::tools::guidance::{HighlightTool, OnboardingTool};
use crate::tools::navigation::{CheckoutTool, NavigateTool, ProfileUpdateTool, SignOutTool};
use crate::tools::types::{StoreTool, ToolCallInput, ToolCallOutput, ToolContext, ToolError};

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn StoreTool>>,
}

impl Default for ToolRegistry {
    /// Creates a new registry with all built-in tools registered.
    fn default() -> Self {
        let mut registry = Self::empty();

        // Catalog
        registry.register(SearchProductsTool);
        registry.register(FilterProductsTool);
        registry.register(ProductLookupTool);
        registry.register(CategoriesTool);
        registry.register(BrandsTool);
        registry.register(FeaturedProductsTool);
        registry.register(CategoryProductsTool);

        // Cart and likes
        registry.register(CartAddTool);
        registry.register(CartRemoveTool);
        registry.register(CartGetTool);
        registry.register(LikesToggleTool);
        registry.register(LikesGetTool);

        // Navigation and account
        registry.register(NavigateTool);
        registry.register(CheckoutTool);
        registry.register(ProfileUpdateTool);
        registry.register(SignOutTool);

        // Guidance
        registry.register(HighlightTool);
        registry.register(OnboardingTool);

        registry
    }
}

impl ToolRegistry {
    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registers a tool under its descriptor name, replacing any previous one.
    pub fn register<T: StoreTool + 'static>(&mut self, tool: T) {
        let name = tool.descriptor().name;
        self.tools.insert(name, Box::new(tool));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all available tools, sorted by name.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        let mut descriptors: Vec<ToolDescriptor> = self.tools.values().map(|t| t.descriptor()).collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Generate a detailed tool reference string for inclusion in LLM prompts.
    pub fn tool_reference_for_prompt(&self) -> String {
        self.list().iter().map(ToolDescriptor::prompt_entry).collect()
    }

    /// Invoke a tool by name with the given arguments.
    pub async fn invoke(&self, ctx: &ToolContext, call: ToolCallInput) -> Result<ToolCallOutput, ToolError> {
        let Some(tool) = self.tools.get(&call.name) else {
            return Err(ToolError::InvalidInput(format!("unknown tool: {}", call.name)));
        };
        tracing::debug!(tool = %call.name, "invoking tool");
        tool.invoke(ctx, call.args).await
    }

    /// Like `invoke`, but failures come back as `ok: false` outputs the
    /// assistant can read.
    pub async fn dispatch(&self, ctx: &ToolContext, call: ToolCallInput) -> ToolCallOutput {
        let name = call.name.clone();
        match self.invoke(ctx, call).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool call failed");
                ToolCallOutput::failure(e.to_string())
            }
        }
    }
}
