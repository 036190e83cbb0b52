//! Correlation key derivation

use std::fmt;

use serde_json::Value;

/// Key matching an asynchronous response to the request that produced it
///
/// Derived from the last element of a batch: the alternation counter, the
/// probabilistic flag, and the request identifier. The remote service echoes
/// all three verbatim, which is what lets replies arrive in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationKey {
    /// Alternation counter (0-65535)
    pub cnt: u16,
    /// Probabilistic-estimate flag
    pub prob: bool,
    /// Request identifier (0-127)
    pub rid: u8,
}

impl CorrelationKey {
    pub fn new(cnt: u16, prob: bool, rid: u8) -> Self {
        Self { cnt, prob, rid }
    }

    /// Derive the key from one JSON object carrying the correlation fields.
    ///
    /// Returns `None` when any field is absent, mistyped, or out of range.
    pub fn from_value(obj: &Value) -> Option<Self> {
        let cnt = u16::try_from(obj.get("cnt")?.as_u64()?).ok()?;
        let prob = obj.get("prob")?.as_bool()?;
        let rid = u8::try_from(obj.get("rid")?.as_u64()?).ok()?;
        Some(Self { cnt, prob, rid })
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Same shape the wire index has always used: "cnt:prob:rid"
        write!(f, "{}:{}:{}", self.cnt, self.prob, self.rid)
    }
}
