//! Peer liveness from heartbeat-bit history
//!
//! A peer proves liveness by flipping the trailing bit of its slot value
//! every heartbeat. The tracker remembers the last bit seen per peer id;
//! an unchanged bit across two observation cycles means a missed
//! heartbeat. A first sighting counts as alive, since there is nothing to
//! compare against yet. Peer records are never removed; a stale record
//! for a vanished peer is harmless. A node does drop its own record when
//! it re-claims a slot, because the reset bit sequence must not be
//! compared against pre-eviction history.

use crate::common::slot::Bit;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PingTracker {
    last_bits: HashMap<String, Bit>,
}

impl PingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation of a peer's heartbeat bit. Returns whether
    /// the peer counts as alive this cycle: true on first sighting or on
    /// a flipped bit, false if the bit is unchanged.
    pub fn observe(&mut self, id: &str, bit: Bit) -> bool {
        match self.last_bits.get(id) {
            Some(&last) if last == bit => false,
            _ => {
                self.last_bits.insert(id.to_string(), bit);
                true
            }
        }
    }

    /// Drop the record for an id. The next observation counts as a first
    /// sighting regardless of bit parity.
    pub fn forget(&mut self, id: &str) {
        self.last_bits.remove(id);
    }
}
