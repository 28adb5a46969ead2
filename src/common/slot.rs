//! Slot value encoding shared by the store and node agents
//!
//! A slot is one store key holding a node's membership record. The wire
//! representation is a plain string: empty (unclaimed), `"<id><bit>"`
//! (claimed, trailing heartbeat bit), or one of the reserved sentinels.
//! The sentinels are part of the protocol contract and must never be valid
//! node identifiers.

/// Reserved value marking a key that has permanently failed.
pub const UNAVAILABLE: &str = "unavailable";

/// Reserved value written by the leader over a slot whose owner stopped
/// heartbeating.
pub const DEAD: &str = "dead";

/// A single heartbeat bit, alternated each cycle. Two consecutive identical
/// bits on a slot mean its owner missed a heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bit {
    Zero,
    One,
}

impl Bit {
    pub fn flipped(self) -> Bit {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
        }
    }

    pub fn from_char(c: char) -> Option<Bit> {
        match c {
            '0' => Some(Bit::Zero),
            '1' => Some(Bit::One),
            _ => None,
        }
    }
}

impl std::fmt::Display for Bit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Decoded state of one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    /// Never claimed (empty string). Terminates a membership scan.
    Empty,
    /// Permanently failed by fault injection.
    Unavailable,
    /// Marked dead by the leader.
    Dead,
    /// Claimed: node id plus its last heartbeat bit.
    Claimed { id: String, bit: Bit },
    /// Anything else. Skipped by scanners; the store never writes this.
    Other(String),
}

impl SlotValue {
    /// Decode a raw store value.
    pub fn parse(raw: &str) -> SlotValue {
        match raw {
            "" => SlotValue::Empty,
            UNAVAILABLE => SlotValue::Unavailable,
            DEAD => SlotValue::Dead,
            _ => {
                let mut chars = raw.chars();
                match chars.next_back().and_then(Bit::from_char) {
                    Some(bit) => SlotValue::Claimed {
                        id: chars.as_str().to_string(),
                        bit,
                    },
                    None => SlotValue::Other(raw.to_string()),
                }
            }
        }
    }
}

/// Encode a node id plus heartbeat bit as a slot value (`"<id><bit>"`).
pub fn tag(id: &str, bit: Bit) -> String {
    format!("{}{}", id, bit.as_char())
}

/// Slot keys are stringified non-negative integers, allocated densely
/// from zero.
pub fn slot_key(index: u64) -> String {
    index.to_string()
}

/// Validate a node identifier: non-empty, no whitespace, and never one of
/// the reserved sentinel strings.
pub fn validate_node_id(id: &str) -> crate::Result<()> {
    if id.is_empty() {
        return Err(crate::Error::InvalidConfig("node id cannot be empty".into()));
    }
    if id.chars().any(|c| c.is_whitespace()) {
        return Err(crate::Error::InvalidConfig(format!(
            "node id must not contain whitespace: {:?}",
            id
        )));
    }
    if id == UNAVAILABLE || id == DEAD {
        return Err(crate::Error::InvalidConfig(format!(
            "node id {:?} is a reserved value",
            id
        )));
    }
    Ok(())
}
