//! Shared types and traits for the storefront tool system.
//!
//! This module defines the core abstractions for tools:
//! - Tool input/output types
//! - The `StoreTool` trait implemented by every assistant action
//! - `ToolContext`, the collaborators a tool may touch
//! - Error types for tool execution

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, Navigator, StoreEvent};
use crate::core::backend::{AccountBackend, BackendError, CartBackend, CatalogBackend, LikesBackend, Permissions};
use crate::core::tool::ToolDescriptor;
use crate::runtime::notify::{Notice, Notifier};

pub const PRODUCTS_PATH: &str = "/products";
pub const SIGN_IN_PATH: &str = "/sign-in";

/// Input to a tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallInput {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Output from a tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallOutput {
    pub ok: bool,
    pub data: serde_json::Value,
    pub error: Option<String>,
}

impl ToolCallOutput {
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            ok: true,
            data,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: serde_json::Value::Null,
            error: Some(error.into()),
        }
    }
}

/// Errors that can occur during tool execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("sign in required to {0}")]
    AuthRequired(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Everything a tool may use. Tools never reach the caches or the UI
/// directly; they mutate through the backends and announce on the bus.
#[derive(Clone)]
pub struct ToolContext {
    pub bus: Arc<EventBus>,
    pub cart: Arc<dyn CartBackend>,
    pub likes: Arc<dyn LikesBackend>,
    pub catalog: Arc<dyn CatalogBackend>,
    pub account: Arc<dyn AccountBackend>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
    pub search_limit: usize,
}

impl ToolContext {
    /// Check the session; when signed out, tell the user and send them to sign-in.
    pub async fn require_authenticated(&self, action: &str) -> Result<Permissions, ToolError> {
        let permissions = self.account.permissions().await?;
        if !permissions.authenticated {
            self.notifier.notify(Notice::error("Please sign in first"));
            self.bus.publish(StoreEvent::navigation(SIGN_IN_PATH));
            return Err(ToolError::AuthRequired(action.to_string()));
        }
        Ok(permissions)
    }

    /// Navigate to the products page unless the user is already on it.
    pub fn show_products_page(&self) {
        if self.navigator.current_path().as_deref() != Some(PRODUCTS_PATH) {
            self.bus.publish(StoreEvent::navigation(PRODUCTS_PATH));
        }
    }
}

/// Trait for implementing storefront tools.
///
/// Tools are invoked from the assistant runtime and must be Send + Sync for
/// use across async boundaries.
#[async_trait]
pub trait StoreTool: Send + Sync {
    /// Returns the descriptor for this tool, including name, description,
    /// and JSON schema for inputs.
    fn descriptor(&self) -> ToolDescriptor;

    /// Invokes the tool with the given context and JSON arguments.
    async fn invoke(&self, ctx: &ToolContext, input: serde_json::Value) -> Result<ToolCallOutput, ToolError>;
}

pub(crate) fn required_str<'a>(input: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ToolError::InvalidInput(format!("{key} required")))
}

pub(crate) fn optional_str<'a>(input: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
