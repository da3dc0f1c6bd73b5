//! Engine configuration.

use std::path::Path;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

fn default_collection() -> String {
    "tasks".to_string()
}

/// Tunables for one [`crate::TaskStore`] instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Document collection the engine mirrors.
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))
    }
}
