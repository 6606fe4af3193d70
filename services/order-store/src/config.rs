//! Store configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

/// How `enumerate` obtains a point-in-time view across symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotStrategy {
    /// Take every symbol lock in shared mode, in symbol order, and copy
    /// while all are held. Mutators on other symbols are never blocked
    /// outside the copy window.
    #[default]
    PerSymbol,
    /// Single store-wide gate: mutators enter it shared, the snapshot
    /// enters it exclusive while copying. Serializes enumeration with
    /// every mutation.
    Global,
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Snapshot consistency mechanism
    pub snapshot_strategy: SnapshotStrategy,
    /// Reject orders with `lot_size <= 0` or `price < 0`
    pub validate_orders: bool,
    /// Record per-operation latency histograms
    pub track_latency: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_strategy: SnapshotStrategy::PerSymbol,
            validate_orders: true,
            track_latency: true,
        }
    }
}

impl StoreConfig {
    /// Parse configuration from a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config = Self::from_json(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        Ok(config)
    }
}
