// Tracker configuration
//
// The durable key is namespaced by the hosting client's storage prefix, a store
// version tag and a context name. The tracker treats the result as opaque.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_STORAGE_PREFIX: &str = "topicstore:core:";
pub const MESSAGES_STORAGE_VERSION: &str = "0.3";
pub const MESSAGES_CONTEXT: &str = "messages";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Prefix supplied by the hosting client for all of its keys
    pub storage_prefix: String,

    /// Version tag of the persisted layout
    pub version: String,

    /// Context name, also used as the logging context
    pub context: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            version: MESSAGES_STORAGE_VERSION.to_string(),
            context: MESSAGES_CONTEXT.to_string(),
        }
    }
}

impl TrackerConfig {
    /// Config with a client-specific prefix and default version/context
    pub fn with_prefix(storage_prefix: impl Into<String>) -> Self {
        Self {
            storage_prefix: storage_prefix.into(),
            ..Self::default()
        }
    }

    /// Load config from a JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: TrackerConfig =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Durable key: `<prefix><version>//<context>`, with `/` in the context
    /// rewritten to `:` so nested contexts cannot collide with the separator.
    pub fn storage_key(&self) -> String {
        format!(
            "{}{}//{}",
            self.storage_prefix,
            self.version,
            self.context.replace('/', ":")
        )
    }
}
