//! Resolver configuration loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a cache entry is recomputed after attach/detach/sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Overwrite with the holder's own associations only. A subject's
    /// inherited role permissions are missing from the entry until the
    /// cache is cleared.
    #[default]
    OwnAssociations,
    /// Overwrite with the full effective set (own merged with role)
    Effective,
}

/// Permission resolver configuration
///
/// ```toml
/// refresh_mode = "effective"
/// track_stats = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub refresh_mode: RefreshMode,

    /// Record cache hit/miss counters
    #[serde(default = "default_true")]
    pub track_stats: bool,
}

fn default_true() -> bool { true }

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            refresh_mode: RefreshMode::default(),
            track_stats: true,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration file {}", path.as_ref().display()))?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ResolverConfig = toml::from_str(contents)
            .context("Failed to parse configuration file")?;

        Ok(config)
    }
}
