//! Node agent: slot claim, heartbeat, membership scan, leadership
//!
//! One agent runs per node process as a single sequential loop; the only
//! suspension point is the fixed-interval wait between cycles. All
//! coordination goes through the shared store; a node learns about its
//! peers exclusively by reading their slots.
//!
//! Per cycle: scan slots from 0 until the first empty one, classify each
//! claimed slot alive or stale from its heartbeat bit, recompute
//! leadership (lowest surviving slot wins), then flip the local bit and
//! heartbeat. The scan is a sequence of independent point reads, not a
//! snapshot; a view mixing states from different moments is accepted
//! protocol behavior.

use crate::common::slot::{self, Bit, SlotValue, DEAD};
use crate::node::client::KvApi;
use crate::node::liveness::PingTracker;
use crate::Result;
use std::time::Duration;

/// Fixed heartbeat and scan period.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);

pub struct NodeAgent<C> {
    client: C,
    id: String,
    bit: Bit,
    slot: u64,
    leader: bool,
    tracker: PingTracker,
}

impl<C: KvApi> NodeAgent<C> {
    /// Create an unassigned agent. `id` must already be validated.
    pub fn new(client: C, id: String) -> Self {
        Self {
            client,
            id,
            bit: Bit::Zero,
            slot: 0,
            leader: false,
            tracker: PingTracker::new(),
        }
    }

    /// The slot value this node last wrote: `"<id><bit>"`.
    pub fn my_tag(&self) -> String {
        slot::tag(&self.id, self.bit)
    }

    /// Index of the slot this node currently owns.
    pub fn slot(&self) -> u64 {
        self.slot
    }

    /// Does this node currently believe itself leader?
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// Claim the lowest free slot via CAS, probing linearly from index 0.
    /// The store's `TestSet` is linearizable, so at most one concurrent
    /// claimer wins each index. O(N) in the number of occupied slots.
    pub async fn claim_slot(&mut self) -> Result<u64> {
        let proposed = self.my_tag();
        let mut index = 0u64;
        loop {
            let result = self
                .client
                .test_set(&slot::slot_key(index), "", &proposed)
                .await?;
            if result == proposed {
                self.slot = index;
                tracing::info!(slot = index, tag = %proposed, "claimed slot");
                return Ok(index);
            }
            index += 1;
        }
    }

    /// Flip the heartbeat bit and write it to this node's slot. The store
    /// reply is not checked here: if the slot has failed, the next scan
    /// notices the eviction.
    pub async fn heartbeat(&mut self) -> Result<()> {
        self.bit = self.bit.flipped();
        let tag = self.my_tag();
        let result = self.client.put(&slot::slot_key(self.slot), &tag).await?;
        tracing::debug!(slot = self.slot, tag = %tag, result = %result, "heartbeat");
        Ok(())
    }

    /// Scan slots from index 0 until the first empty one and rebuild the
    /// membership view: the tags of every peer whose heartbeat bit moved
    /// since the last cycle, in slot order. Peers with an unchanged bit
    /// missed a heartbeat; if this node is currently leader it marks their
    /// slots dead.
    pub async fn scan(&mut self) -> Result<Vec<String>> {
        let mut view = Vec::new();
        let mut index = 0u64;
        loop {
            let key = slot::slot_key(index);
            let raw = self.client.get(&key).await?;
            match SlotValue::parse(&raw) {
                SlotValue::Empty => break,
                SlotValue::Unavailable | SlotValue::Dead => {}
                SlotValue::Other(val) => {
                    tracing::warn!(slot = index, val = %val, "unrecognized slot value");
                }
                SlotValue::Claimed { id, bit } => {
                    if self.tracker.observe(&id, bit) {
                        view.push(slot::tag(&id, bit));
                    } else if self.leader {
                        tracing::info!(slot = index, peer = %id, "missed heartbeat, marking dead");
                        self.client.put(&key, DEAD).await?;
                    } else {
                        tracing::debug!(slot = index, peer = %id, "missed heartbeat");
                    }
                }
            }
            index += 1;
        }
        Ok(view)
    }

    /// Recompute leadership from a freshly built view: the lowest
    /// surviving slot leads. There is no term or fencing token; any node
    /// becomes leader the instant every lower slot has left the view.
    fn update_leadership(&mut self, view: &[String]) {
        let was_leader = self.leader;
        self.leader = view.first().map(String::as_str) == Some(self.my_tag().as_str());
        if self.leader && !was_leader {
            tracing::info!(slot = self.slot, "assuming leadership");
        }
    }

    /// One full protocol cycle: scan, recompute leadership (or detect
    /// self-eviction and reclaim a fresh slot), then heartbeat. Returns
    /// the membership view built by the scan.
    pub async fn cycle(&mut self) -> Result<Vec<String>> {
        let view = self.scan().await?;
        if view.contains(&self.my_tag()) {
            self.update_leadership(&view);
            self.report(&view);
        } else {
            // Own slot vanished from the view (failed or marked dead
            // behind our back): drop any leadership claim, reset the bit
            // sequence, and claim a fresh slot. Membership is not
            // reported this cycle. The tracker must forget our own record
            // along with the reset: a stale pre-eviction bit that happens
            // to match the fresh sequence would read as a missed
            // heartbeat and evict the new slot too.
            tracing::warn!(slot = self.slot, "evicted from membership, reclaiming");
            self.leader = false;
            self.bit = Bit::Zero;
            self.tracker.forget(&self.id);
            self.claim_slot().await?;
        }
        self.heartbeat().await?;
        Ok(view)
    }

    /// Run the agent: claim a slot, then loop scan / heartbeat forever.
    /// Any transport error propagates out and is fatal to the process;
    /// there is no retry or reconnection.
    pub async fn run(&mut self) -> Result<()> {
        self.claim_slot().await?;

        let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
        // The first tick completes immediately; consume it so every cycle
        // below ends with a full-interval wait.
        ticker.tick().await;

        loop {
            self.cycle().await?;
            ticker.tick().await;
        }
    }

    /// Log the current membership, leader first, heartbeat bits stripped.
    fn report(&self, view: &[String]) {
        let ids: Vec<&str> = view.iter().map(|tag| &tag[..tag.len() - 1]).collect();
        tracing::info!(leader = self.leader, "members: {}", ids.join(" "));
    }
}
