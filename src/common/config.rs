//! Configuration for coordkv components
//!
//! Both binaries take their settings from CLI flags, optionally merged with
//! a TOML file. A file may supply any subset of the fields: it is read
//! through a partial struct, merged over the defaults, and CLI flags then
//! override the result. Validation happens once, at startup; anything out
//! of range is fatal.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::common::slot::validate_node_id;
use crate::{Error, Result};

/// Store service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Address the gRPC service listens on
    pub bind_addr: SocketAddr,

    /// Probability in [0,1] that any single key operation triggers
    /// permanent unavailability of that key
    #[serde(default)]
    pub fail_prob: f64,

    /// Optional RNG seed for a deterministic unavailability pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:6070".parse().unwrap(),
            fail_prob: 0.0,
            seed: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialStoreConfig {
    bind_addr: Option<SocketAddr>,
    fail_prob: Option<f64>,
    seed: Option<u64>,
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fail_prob) {
            return Err(Error::InvalidConfig(format!(
                "fail-prob must be in range [0,1], got {}",
                self.fail_prob
            )));
        }
        Ok(())
    }

    /// Load from a TOML file; fields the file omits keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let partial: PartialStoreConfig = load_toml(path)?;
        let mut cfg = Self::default();
        if let Some(bind_addr) = partial.bind_addr {
            cfg.bind_addr = bind_addr;
        }
        if let Some(fail_prob) = partial.fail_prob {
            cfg.fail_prob = fail_prob;
        }
        if let Some(seed) = partial.seed {
            cfg.seed = Some(seed);
        }
        Ok(cfg)
    }
}

/// Node agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Store service endpoint, e.g. `http://127.0.0.1:6070`
    pub store_addr: String,

    /// Unique identifier for this node (no whitespace, not a sentinel)
    pub node_id: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            store_addr: "http://127.0.0.1:6070".to_string(),
            node_id: String::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialNodeConfig {
    store_addr: Option<String>,
    node_id: Option<String>,
}

impl NodeConfig {
    pub fn validate(&self) -> Result<()> {
        validate_node_id(&self.node_id)
    }

    /// Load from a TOML file; fields the file omits keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let partial: PartialNodeConfig = load_toml(path)?;
        let mut cfg = Self::default();
        if let Some(store_addr) = partial.store_addr {
            cfg.store_addr = store_addr;
        }
        if let Some(node_id) = partial.node_id {
            cfg.node_id = node_id;
        }
        Ok(cfg)
    }
}

fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    config::Config::builder()
        .add_source(config::File::from(path))
        .build()
        .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?
        .try_deserialize()
        .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))
}
