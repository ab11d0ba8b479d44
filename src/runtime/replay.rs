//! JSON-lines command driver.
//!
//! Each input line is one [`ReplayCommand`]; each produces one JSON output
//! line. Blank lines are skipped. A line that fails to parse yields an
//! `error` output and the replay continues.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::cache::CacheStatus;
use crate::core::cart::CartLine;
use crate::core::product::Product;
use crate::highlight::{OverlayView, SequencerState};
use crate::tools::{ToolCallInput, ToolCallOutput};
use crate::{Storefront, SyncError};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReplayCommand {
    /// Assistant tool call.
    Tool {
        name: String,
        #[serde(default)]
        args: serde_json::Value,
    },
    /// UI-side cart add through the optimistic cache.
    AddToCart {
        product_id: String,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
    UpdateCartItem { line_id: String, quantity: i64 },
    RemoveFromCart { line_id: String },
    ToggleLike { product_id: String },
    /// Dismiss the AI search banner.
    ClearSearch,
    /// Let timers run.
    Wait { ms: u64 },
    /// Dump the client state.
    State,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize)]
pub struct CartState {
    pub status: CacheStatus,
    pub items: Vec<CartLine>,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientState {
    pub path: Option<String>,
    pub cart: CartState,
    pub likes: Vec<String>,
    pub search_query: Option<String>,
    pub search_results: usize,
    pub highlight: SequencerState,
    pub overlay: Option<OverlayView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplayOutput {
    Tool(ToolCallOutput),
    Done,
    State(Box<ClientState>),
    Error { message: String },
}

/// Read commands from `reader` until EOF; returns how many were handled.
pub async fn run_replay<R, W>(storefront: &Storefront, reader: R, mut writer: W) -> Result<usize, SyncError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let output = match serde_json::from_str::<ReplayCommand>(line) {
            Ok(command) => {
                handled += 1;
                execute(storefront, command).await
            }
            Err(e) => {
                tracing::warn!("skipping malformed replay line: {e}");
                ReplayOutput::Error {
                    message: format!("malformed command: {e}"),
                }
            }
        };

        let mut encoded = serde_json::to_string(&output).map_err(|e| SyncError::Other(e.to_string()))?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(handled)
}

async fn execute(storefront: &Storefront, command: ReplayCommand) -> ReplayOutput {
    let result = match command {
        ReplayCommand::Tool { name, args } => {
            return ReplayOutput::Tool(storefront.invoke_tool(ToolCallInput { name, args }).await);
        }
        ReplayCommand::AddToCart { product_id, quantity } => storefront.add_to_cart(&product_id, quantity).await,
        ReplayCommand::UpdateCartItem { line_id, quantity } => {
            storefront.update_cart_item(&line_id, quantity).await
        }
        ReplayCommand::RemoveFromCart { line_id } => storefront.remove_from_cart(&line_id).await,
        ReplayCommand::ToggleLike { product_id } => storefront.toggle_like(&product_id).await,
        ReplayCommand::ClearSearch => {
            storefront.search().clear();
            Ok(())
        }
        ReplayCommand::Wait { ms } => {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(())
        }
        ReplayCommand::State => {
            return match client_state(storefront).await {
                Ok(state) => ReplayOutput::State(Box::new(state)),
                Err(e) => ReplayOutput::Error { message: e.to_string() },
            };
        }
    };

    match result {
        Ok(()) => ReplayOutput::Done,
        Err(e) => ReplayOutput::Error { message: e.to_string() },
    }
}

/// Snapshot of everything a page render would read.
pub async fn client_state(storefront: &Storefront) -> Result<ClientState, SyncError> {
    let cart = storefront.cart().read().await?;
    let likes = storefront.likes().read().await?;
    let search = storefront.search().get_snapshot();

    Ok(ClientState {
        path: storefront.navigator().current_path(),
        cart: CartState {
            status: storefront.cart().peek().status,
            items: cart.visible_lines().cloned().collect(),
            total: cart.total,
        },
        likes: likes.iter().map(str::to_string).collect(),
        search_query: search.query.clone(),
        search_results: search.results.len(),
        highlight: storefront.sequencer().state(),
        overlay: storefront.sequencer().overlay(),
    })
}

/// Read a JSON array of products.
pub fn load_catalog(path: &str) -> Result<Vec<Product>, SyncError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| SyncError::Other(format!("invalid catalog {path}: {e}")))
}

/// Small catalog used when no catalog file is given.
pub fn demo_catalog() -> Vec<Product> {
    let entries: [(&str, &str, &str, &str, f64, f32); 6] = [
        ("p-aero-14", "Aero Laptop 14", "Aero", "laptops", 999.0, 4.6),
        ("p-aero-16", "Aero Laptop 16 Pro", "Aero", "laptops", 1499.0, 4.8),
        ("p-sonic-h1", "Sonic H1 Headphones", "Sonic", "audio", 199.0, 4.2),
        ("p-sonic-buds", "Sonic Buds", "Sonic", "audio", 89.0, 3.9),
        ("p-pixel-cam", "Pixel Mirrorless Camera", "Pixel", "cameras", 749.0, 4.4),
        ("p-volt-watch", "Volt Smartwatch", "Volt", "wearables", 249.0, 4.0),
    ];
    entries
        .into_iter()
        .map(|(id, name, brand, category, price, rating)| {
            let mut product = Product::new(id, name, price);
            product.brand = brand.to_string();
            product.category = category.to_string();
            product.rating = Some(rating);
            product
        })
        .collect()
}
