//! Wire objects exchanged with the estimation service
//!
//! Everything on the wire is JSON. Outbound batches travel under the
//! `"OBJECT"` tag; inbound messages are either estimate batches or control
//! messages carrying a `"type"` field.

use serde::{Deserialize, Serialize};

use super::key::CorrelationKey;

/// One object in an outbound batch
///
/// The same shape is sent for prediction and training; a training send
/// additionally carries the observed value in `train`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundObject {
    /// History window used as model input, oldest first
    pub vars: Vec<i64>,
    /// True on the first object of a session
    pub reset: bool,
    /// User identifier, echoed by the service
    pub uid: u32,
    /// Request identifier (0-127), echoed by the service
    pub rid: u8,
    /// Request probability-weighted candidate lists instead of scalars
    pub prob: bool,
    /// Alternation counter (0-65535); even = prediction, odd = training
    pub cnt: u16,
    /// Observed value to train on; present only on training sends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train: Option<i64>,
}

impl OutboundObject {
    pub fn key(&self) -> CorrelationKey {
        CorrelationKey::new(self.cnt, self.prob, self.rid)
    }
}

/// One element of an inbound estimate batch
///
/// The correlation fields (`cnt`, `prob`, `rid`) echo the request; exactly
/// one of `est` / `ests` carries the estimate on prediction responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEstimate {
    pub cnt: u16,
    pub prob: bool,
    pub rid: u8,
    /// Scalar estimate (non-probabilistic responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub est: Option<i64>,
    /// Probability-weighted candidates (probabilistic responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ests: Option<Vec<WeightedEstimate>>,
    /// Echoed training value on training acknowledgments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train: Option<i64>,
}

impl InboundEstimate {
    pub fn key(&self) -> CorrelationKey {
        CorrelationKey::new(self.cnt, self.prob, self.rid)
    }
}

/// A probability-weighted candidate: `num`/`denom` of the observed mass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedEstimate {
    pub est: i64,
    pub num: i64,
    pub denom: i64,
}
