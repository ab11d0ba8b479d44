//! Runtime configuration.
//!
//! Sources, in order: `.env` (via dotenvy), the JSON file named by
//! `STOREFRONT_SYNC_CONFIG`, then individual `STOREFRONT_*` overrides.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::bus::DEFAULT_BUS_CAPACITY;

pub const CONFIG_PATH_ENV: &str = "STOREFRONT_SYNC_CONFIG";

/// Delay between scrolling a target into view and marking it active.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 400;
/// Auto-clear delay for a single highlight without an explicit duration.
pub const DEFAULT_HIGHLIGHT_DURATION_MS: u64 = 3_000;
/// Per-step duration of a tour step without an explicit duration.
pub const DEFAULT_TOUR_STEP_MS: u64 = 3_500;
/// Pause between the end of one tour step and the start of the next.
pub const DEFAULT_TOUR_GAP_MS: u64 = 500;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_highlight_duration_ms")]
    pub default_duration_ms: u64,
    #[serde(default = "default_tour_step_ms")]
    pub tour_step_ms: u64,
    #[serde(default = "default_tour_gap_ms")]
    pub tour_gap_ms: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            default_duration_ms: DEFAULT_HIGHLIGHT_DURATION_MS,
            tour_step_ms: DEFAULT_TOUR_STEP_MS,
            tour_gap_ms: DEFAULT_TOUR_GAP_MS,
        }
    }
}

impl HighlightConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn tour_gap(&self) -> Duration {
        Duration::from_millis(self.tour_gap_ms)
    }
}

/// Tooltip geometry, in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipConfig {
    /// Minimum space below (and above) the target before flipping.
    #[serde(default = "default_flip_threshold")]
    pub flip_threshold: f64,
    #[serde(default = "default_above_offset")]
    pub above_offset: f64,
    #[serde(default = "default_below_offset")]
    pub below_offset: f64,
    #[serde(default = "default_horizontal_margin")]
    pub horizontal_margin: f64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            flip_threshold: default_flip_threshold(),
            above_offset: default_above_offset(),
            below_offset: default_below_offset(),
            horizontal_margin: default_horizontal_margin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub tooltip: TooltipConfig,
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            highlight: HighlightConfig::default(),
            tooltip: TooltipConfig::default(),
            bus_capacity: default_bus_capacity(),
            search_limit: default_search_limit(),
        }
    }
}

impl SyncConfig {
    /// Load from the environment (see module docs).
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply `STOREFRONT_*` overrides read through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        override_u64(&lookup, "STOREFRONT_HIGHLIGHT_SETTLE_MS", &mut self.highlight.settle_delay_ms);
        override_u64(
            &lookup,
            "STOREFRONT_HIGHLIGHT_DURATION_MS",
            &mut self.highlight.default_duration_ms,
        );
        override_u64(&lookup, "STOREFRONT_TOUR_STEP_MS", &mut self.highlight.tour_step_ms);
        override_u64(&lookup, "STOREFRONT_TOUR_GAP_MS", &mut self.highlight.tour_gap_ms);

        let mut capacity = self.bus_capacity as u64;
        override_u64(&lookup, "STOREFRONT_BUS_CAPACITY", &mut capacity);
        self.bus_capacity = usize::try_from(capacity).unwrap_or(DEFAULT_BUS_CAPACITY).max(1);
    }
}

fn override_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut u64) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<u64>() {
        Ok(value) => *target = value,
        Err(e) => tracing::warn!("ignoring {key}={raw:?}: {e}"),
    }
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

fn default_highlight_duration_ms() -> u64 {
    DEFAULT_HIGHLIGHT_DURATION_MS
}

fn default_tour_step_ms() -> u64 {
    DEFAULT_TOUR_STEP_MS
}

fn default_tour_gap_ms() -> u64 {
    DEFAULT_TOUR_GAP_MS
}

fn default_flip_threshold() -> f64 {
    120.0
}

fn default_above_offset() -> f64 {
    60.0
}

fn default_below_offset() -> f64 {
    16.0
}

fn default_horizontal_margin() -> f64 {
    120.0
}

fn default_bus_capacity() -> usize {
    DEFAULT_BUS_CAPACITY
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"highlight": {{"tour_gap_ms": 250}}, "search_limit": 5}}"#).unwrap();

        let config = SyncConfig::from_file(file.path()).unwrap();
        assert_eq!(config.highlight.tour_gap_ms, 250);
        assert_eq!(config.highlight.settle_delay_ms, DEFAULT_SETTLE_DELAY_MS);
        assert_eq!(config.search_limit, 5);
        assert_eq!(config.tooltip, TooltipConfig::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            SyncConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn env_overrides_apply_and_bad_values_are_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("STOREFRONT_HIGHLIGHT_SETTLE_MS", "100"),
            ("STOREFRONT_TOUR_STEP_MS", "soon"),
            ("STOREFRONT_BUS_CAPACITY", "0"),
        ]);
        let mut config = SyncConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.highlight.settle_delay_ms, 100);
        assert_eq!(config.highlight.tour_step_ms, DEFAULT_TOUR_STEP_MS);
        assert_eq!(config.bus_capacity, 1);
    }
}
