//! Store tuning, loadable from RON.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default number of resolved schemas kept by the schema cache.
pub const DEFAULT_SCHEMA_CACHE_CAPACITY: usize = 64;

/// Runtime knobs for a [`Store`](crate::Store).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Maximum number of resolved schemas cached by identity.
    pub schema_cache_capacity: usize,
    /// Notify subscribers even when a write leaves the value unchanged.
    pub notify_unchanged: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            schema_cache_capacity: DEFAULT_SCHEMA_CACHE_CAPACITY,
            notify_unchanged: false,
        }
    }
}

impl StoreConfig {
    /// Parse a config from RON text. Missing fields take their defaults.
    pub fn from_ron(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| Error::Config(e.to_string()))
    }
}
