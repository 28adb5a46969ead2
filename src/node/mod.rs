//! Node agent: store-mediated membership, heartbeating, and leadership

pub mod agent;
pub mod client;
pub mod liveness;

pub use agent::{NodeAgent, HEARTBEAT_INTERVAL};
pub use client::{KvApi, StoreClient};
pub use liveness::PingTracker;
