//! # coordkv
//!
//! A minimal distributed coordination system built around a shared
//! key-value service:
//! - One authoritative store process exposing `Get` / `Put` / `TestSet`
//!   (compare-and-swap) over gRPC, with probabilistic permanent key failure
//! - Node agents that claim membership slots via CAS, heartbeat them with an
//!   alternating bit, detect peer liveness, and elect a leader, without any
//!   node-to-node communication
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────────────────┐
//!                │       Store Service      │
//!                │  Get / Put / TestSet     │
//!                │  (single shared engine,  │
//!                │   per-key sticky faults) │
//!                └─────┬──────┬──────┬──────┘
//!                      │ gRPC │      │
//!              ┌───────▼─┐ ┌──▼──────┐ ┌▼────────┐
//!              │ Node A  │ │ Node B  │ │ Node C  │
//!              │ slot 0  │ │ slot 1  │ │ slot 2  │
//!              └─────────┘ └─────────┘ └─────────┘
//! ```
//!
//! Every interaction between nodes is mediated by the store: slots are
//! claimed with `TestSet`, heartbeats are `Put`s that flip a trailing bit,
//! and the membership view is rebuilt each cycle by scanning slots from 0
//! until the first empty key. The lowest surviving slot is the leader.
//!
//! ## Usage
//!
//! ### Start the store service
//! ```bash
//! coordkv-store serve --bind 127.0.0.1:6070 --fail-prob 0.01
//! ```
//!
//! ### Start node agents
//! ```bash
//! coordkv-node run --store http://127.0.0.1:6070 --id alpha
//! coordkv-node run --store http://127.0.0.1:6070 --id beta
//! ```

pub mod common;
pub mod node;
pub mod store;

// Re-export commonly used types
pub use common::{Error, Result};
pub use node::NodeAgent;
pub use store::{KvEngine, StoreServer};

// Generated protobuf code
pub mod proto {
    tonic::include_proto!("coordkv");
}

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
