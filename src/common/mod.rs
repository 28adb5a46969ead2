//! Common utilities and types shared across coordkv

pub mod config;
pub mod error;
pub mod slot;

pub use config::{NodeConfig, StoreConfig};
pub use error::{Error, Result};
pub use slot::{validate_node_id, SlotValue, DEAD, UNAVAILABLE};
