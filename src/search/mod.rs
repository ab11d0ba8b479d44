//! Channel exposing the assistant's latest product search to the UI.

mod channel;

pub use channel::{get_server_snapshot, AiSearchChannel, AiSearchSnapshot};
