//! Coordination protocol tests, run in-process against a shared engine
//!
//! The agents here talk to one `Arc<KvEngine>` through the same `KvApi`
//! seam the gRPC client implements, so claim / scan / leadership logic is
//! exercised without sockets. Cycles are driven manually instead of
//! waiting out the heartbeat interval.

use coordkv::store::KvEngine;
use coordkv::NodeAgent;
use std::collections::HashSet;
use std::sync::Arc;

fn engine() -> Arc<KvEngine> {
    Arc::new(KvEngine::new(0.0).unwrap())
}

fn agent(id: &str, kv: &Arc<KvEngine>) -> NodeAgent<Arc<KvEngine>> {
    NodeAgent::new(kv.clone(), id.to_string())
}

#[tokio::test]
async fn test_claim_skips_occupied_index() {
    let kv = engine();
    kv.put("0", "other1");
    kv.put("1", "busy0");

    let mut a = agent("alpha", &kv);
    assert_eq!(a.claim_slot().await.unwrap(), 2);
    assert_eq!(kv.get("2"), "alpha0");
}

#[tokio::test]
async fn test_concurrent_claimers_get_distinct_slots() {
    let kv = engine();
    let mut handles = Vec::new();
    for i in 0..8 {
        let kv = kv.clone();
        handles.push(tokio::spawn(async move {
            let mut a = NodeAgent::new(kv, format!("node-{}", i));
            a.claim_slot().await.unwrap()
        }));
    }

    let mut slots = HashSet::new();
    for handle in handles {
        slots.insert(handle.await.unwrap());
    }
    assert_eq!(slots, (0..8).collect::<HashSet<u64>>());
}

#[tokio::test]
async fn test_scan_classifies_stale_peer() {
    let kv = engine();
    // Slots as seen by an outside observer: three claimed peers.
    kv.put("0", "A0");
    kv.put("1", "B1");
    kv.put("2", "C0");

    let mut observer = agent("obs", &kv);

    // First cycle: no prior records, everyone counts as alive.
    let view = observer.scan().await.unwrap();
    assert_eq!(view, vec!["A0", "B1", "C0"]);

    // A and C flip their bits; B does not.
    kv.put("0", "A1");
    kv.put("2", "C1");

    let view = observer.scan().await.unwrap();
    assert_eq!(view, vec!["A1", "C1"]);

    // The observer is not leader, so B's slot is untouched.
    assert_eq!(kv.get("1"), "B1");
}

#[tokio::test]
async fn test_scan_skips_dead_and_unavailable_slots() {
    let kv = engine();
    kv.put("0", "dead");
    kv.put("1", "unavailable");
    kv.put("2", "A0");

    let mut observer = agent("obs", &kv);
    let view = observer.scan().await.unwrap();
    assert_eq!(view, vec!["A0"]);
}

#[tokio::test]
async fn test_scan_stops_at_first_empty_slot() {
    let kv = engine();
    kv.put("0", "A0");
    // Slot 1 untouched; slot 2 beyond the gap must not be reached.
    kv.put("2", "B0");

    let mut observer = agent("obs", &kv);
    let view = observer.scan().await.unwrap();
    assert_eq!(view, vec!["A0"]);
}

#[tokio::test]
async fn test_lowest_slot_leads() {
    let kv = engine();
    let mut a = agent("alpha", &kv);
    let mut b = agent("beta", &kv);
    a.claim_slot().await.unwrap();
    b.claim_slot().await.unwrap();

    let view = a.cycle().await.unwrap();
    assert_eq!(view, vec!["alpha0", "beta0"]);
    assert!(a.is_leader());

    let view = b.cycle().await.unwrap();
    // Alpha heartbeated during its cycle, so beta sees the flipped bit.
    assert_eq!(view, vec!["alpha1", "beta0"]);
    assert!(!b.is_leader());
}

#[tokio::test]
async fn test_leader_marks_stale_peer_dead() {
    let kv = engine();
    let mut a = agent("alpha", &kv);
    let mut b = agent("beta", &kv);
    a.claim_slot().await.unwrap();
    b.claim_slot().await.unwrap();

    // First cycle establishes alpha as leader and records beta's bit.
    a.cycle().await.unwrap();
    assert!(a.is_leader());

    // Beta never heartbeats. On the next cycle its bit is unchanged, so
    // the leader marks the slot dead and drops it from the view.
    let view = a.cycle().await.unwrap();
    assert_eq!(view, vec!["alpha1"]);
    assert_eq!(kv.get("1"), "dead");
}

#[tokio::test]
async fn test_non_leader_never_marks_dead() {
    let kv = engine();
    let mut a = agent("alpha", &kv);
    let mut b = agent("beta", &kv);
    let mut c = agent("gamma", &kv);
    a.claim_slot().await.unwrap();
    b.claim_slot().await.unwrap();
    c.claim_slot().await.unwrap();

    // Gamma observes everyone, then beta goes silent while alpha and
    // gamma keep heartbeating.
    c.cycle().await.unwrap();
    assert!(!c.is_leader());
    a.heartbeat().await.unwrap();

    let view = c.cycle().await.unwrap();
    assert!(!view.contains(&"beta0".to_string()));
    // Gamma is not leader, so beta's slot must be left alone.
    assert_eq!(kv.get("1"), "beta0");
}

#[tokio::test]
async fn test_leadership_passes_to_next_slot() {
    let kv = engine();
    let mut a = agent("alpha", &kv);
    let mut c = agent("gamma", &kv);
    a.claim_slot().await.unwrap();
    c.claim_slot().await.unwrap();

    c.cycle().await.unwrap();
    assert!(!c.is_leader());

    // Alpha's slot dies; gamma now owns the lowest surviving slot.
    kv.put("0", "dead");
    let view = c.cycle().await.unwrap();
    assert_eq!(view, vec!["gamma1"]);
    assert!(c.is_leader());
}

#[tokio::test]
async fn test_self_eviction_triggers_reclaim() {
    let kv = engine();
    let mut a = agent("alpha", &kv);
    let mut b = agent("beta", &kv);
    a.claim_slot().await.unwrap();
    b.claim_slot().await.unwrap();
    assert_eq!(a.slot(), 0);

    // Alpha's slot is killed behind its back.
    kv.put("0", "dead");

    let view = a.cycle().await.unwrap();
    // The view built that cycle does not include alpha, and alpha must
    // have claimed the next free slot with a reset bit sequence.
    assert!(!view.iter().any(|tag| tag.starts_with("alpha")));
    assert_eq!(a.slot(), 2);
    assert!(!a.is_leader());
    // The cycle's trailing heartbeat flipped the fresh claim's bit.
    assert_eq!(kv.get("2"), "alpha1");
}

#[tokio::test]
async fn test_reclaimed_slot_survives_later_cycles() {
    // Two full cycles before the eviction leave the node's own tracker
    // record at bit one, the same parity the reset bit sequence produces
    // after the re-claim heartbeat. The fresh slot must still read as
    // alive on the following cycles rather than being abandoned.
    let kv = engine();
    let mut a = agent("alpha", &kv);
    a.claim_slot().await.unwrap();
    a.cycle().await.unwrap();
    a.cycle().await.unwrap();

    kv.put("0", "dead");
    a.cycle().await.unwrap();
    assert_eq!(a.slot(), 1);

    let view = a.cycle().await.unwrap();
    assert_eq!(view, vec!["alpha1"]);
    assert_eq!(a.slot(), 1);
    assert!(a.is_leader());

    let view = a.cycle().await.unwrap();
    assert_eq!(view, vec!["alpha0"]);
    assert_eq!(a.slot(), 1);
}

#[tokio::test]
async fn test_evicted_leader_drops_leadership() {
    let kv = engine();
    let mut a = agent("alpha", &kv);
    a.claim_slot().await.unwrap();
    a.cycle().await.unwrap();
    assert!(a.is_leader());

    kv.put("0", "unavailable");
    a.cycle().await.unwrap();
    assert!(!a.is_leader());
    assert_eq!(a.slot(), 1);
}

#[tokio::test]
async fn test_claims_survive_unavailable_slots() {
    // A failed slot never CAS-matches the empty string, so the probe
    // must keep walking rather than claim it.
    let kv = engine();
    kv.put("0", "unavailable");
    kv.put("1", "unavailable");

    let mut a = agent("alpha", &kv);
    assert_eq!(a.claim_slot().await.unwrap(), 2);
}
