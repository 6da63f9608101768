//! Distributor configuration.
//!
//! Loaded from JSON:
//!
//! ```json
//! {
//!   "owner": "0x…",
//!   "roots": [{ "token": "0x…", "root": "0x…" }],
//!   "trace_events": true
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use dropcraft_core::{hex_encode, serde_address, serde_hash, Address, Hash, TokenId};
use serde::{Deserialize, Serialize};

use crate::{Result, SettlementError};

/// A root to register at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootEntry {
    #[serde(with = "serde_address")]
    pub token: TokenId,
    #[serde(with = "serde_hash")]
    pub root: Hash,
}

/// Distributor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorConfig {
    /// Identity allowed to set roots
    #[serde(with = "serde_address")]
    pub owner: Address,
    /// Roots applied on construction, in order
    #[serde(default)]
    pub roots: Vec<RootEntry>,
    /// Attach a `TracingSink` for structured `Claimed` records. Off by
    /// default: the distributor already logs each claim once.
    #[serde(default)]
    pub trace_events: bool,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            owner: [0u8; 20],
            roots: Vec::new(),
            trace_events: false,
        }
    }
}

impl DistributorConfig {
    /// Configuration with the given owner and no initial roots.
    pub fn with_owner(owner: Address) -> Self {
        Self {
            owner,
            ..Default::default()
        }
    }

    /// Add an initial root (builder style).
    pub fn root(mut self, token: TokenId, root: Hash) -> Self {
        self.roots.push(RootEntry { token, root });
        self
    }

    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SettlementError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| SettlementError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that register the same token twice.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.roots {
            if !seen.insert(entry.token) {
                return Err(SettlementError::Config(format!(
                    "duplicate root for token {}",
                    hex_encode(entry.token)
                )));
            }
        }
        Ok(())
    }
}
