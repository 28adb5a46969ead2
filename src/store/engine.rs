//! In-memory key-value engine with synthetic permanent key failure
//!
//! The engine owns all slot state. Three operations are exposed (`get`,
//! `put`, and `test_set`), all gated by the same failure-injection policy:
//! on every operation the key may, with probability `fail_prob`, become
//! permanently `"unavailable"`. Failure is sticky per key and independent
//! across keys and operations.
//!
//! A single mutex covers the whole map, so the three operations are
//! linearizable across every connected client. Callers never see a
//! partially-applied update. `test_set` is the atomic primitive all
//! higher-level coordination is built on.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::common::slot::UNAVAILABLE;
use crate::{Error, Result};

/// The shared key-value engine.
pub struct KvEngine {
    fail_prob: f64,
    inner: Mutex<Inner>,
}

struct Inner {
    map: HashMap<String, String>,
    rng: StdRng,
}

impl KvEngine {
    /// Create an engine with the given per-operation key failure
    /// probability, seeded from entropy.
    pub fn new(fail_prob: f64) -> Result<Self> {
        Self::with_rng(fail_prob, StdRng::from_entropy())
    }

    /// Create an engine with a fixed seed for a deterministic
    /// unavailability pattern.
    pub fn with_seed(fail_prob: f64, seed: u64) -> Result<Self> {
        Self::with_rng(fail_prob, StdRng::seed_from_u64(seed))
    }

    fn with_rng(fail_prob: f64, rng: StdRng) -> Result<Self> {
        if !(0.0..=1.0).contains(&fail_prob) {
            return Err(Error::InvalidConfig(format!(
                "fail-prob must be in range [0,1], got {}",
                fail_prob
            )));
        }
        Ok(Self {
            fail_prob,
            inner: Mutex::new(Inner {
                map: HashMap::new(),
                rng,
            }),
        })
    }

    /// Look up a key, initializing it on first use. Returns the current
    /// value, or `"unavailable"` if the key has failed.
    pub fn get(&self, key: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        let Inner { map, rng } = &mut *inner;
        let val = map.entry(key.to_string()).or_default();
        if check_key_fail(val, rng, self.fail_prob) {
            return UNAVAILABLE.to_string();
        }
        val.clone()
    }

    /// Unconditionally overwrite a key. Returns the empty string on
    /// success, `"unavailable"` if the key has failed.
    pub fn put(&self, key: &str, new_val: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        let Inner { map, rng } = &mut *inner;
        let val = map.entry(key.to_string()).or_default();
        if check_key_fail(val, rng, self.fail_prob) {
            return UNAVAILABLE.to_string();
        }
        *val = new_val.to_string();
        String::new()
    }

    /// Compare-and-swap: if the current value equals `test_val`, replace it
    /// with `new_val`. Returns the value after the attempted update:
    /// `new_val` on success, the unchanged value on mismatch, or
    /// `"unavailable"` if the key has failed.
    pub fn test_set(&self, key: &str, test_val: &str, new_val: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        let Inner { map, rng } = &mut *inner;
        let val = map.entry(key.to_string()).or_default();
        if check_key_fail(val, rng, self.fail_prob) {
            return UNAVAILABLE.to_string();
        }
        if val.as_str() == test_val {
            *val = new_val.to_string();
        }
        val.clone()
    }
}

/// Failure gate, evaluated under the engine lock on every operation.
/// An already-failed key short-circuits; otherwise one uniform sample in
/// [0,1) decides whether the key fails now, permanently.
fn check_key_fail(val: &mut String, rng: &mut StdRng, fail_prob: f64) -> bool {
    if val.as_str() == UNAVAILABLE {
        return true;
    }
    if rng.gen::<f64>() < fail_prob {
        *val = UNAVAILABLE.to_string();
        return true;
    }
    false
}
