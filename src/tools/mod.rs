//! Assistant-callable storefront tools.
//!
//! This module provides:
//! - Tool registry for dynamic tool discovery
//! - Catalog tools: search, filter, product lookup, categories, brands, featured
//! - Cart and likes tools
//! - Navigation, checkout and account tools
//! - Guidance tools: element highlights and onboarding tours
//!
//! # Tool Lifecycle
//!
//! 1. The assistant runtime calls `ToolRegistry::dispatch`
//! 2. The tool checks the session where the action needs one
//! 3. The tool calls its backend
//! 4. The tool announces the change on the event bus
//!
//! Tools never touch caches or UI state directly; subscribers on the bus
//! react to what the tool published.
//!
//! # Module Structure
//!
//! - `types`: Core types (StoreTool trait, ToolContext, ToolCallInput/Output, ToolError)
//! - `registry`: ToolRegistry for managing and invoking tools
//! - `catalog`, `cart`, `navigation`, `guidance`: tool implementations

pub use catalog::{BROWSE_LIMIT, FEATURED_LIMIT};
pub use guidance::{TourPage, HIGHLIGHT_ELEMENTS, TOOL_HIGHLIGHT_DURATION_MS};
pub use navigation::Page;
pub use registry::ToolRegistry;
pub use types::{StoreTool, ToolCallInput, ToolCallOutput, ToolContext, ToolError, PRODUCTS_PATH, SIGN_IN_PATH};

mod cart;
mod catalog;
mod guidance;
mod navigation;
mod registry;
mod types;
