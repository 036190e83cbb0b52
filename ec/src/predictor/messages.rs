//! Consumer-facing prediction types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::correlator::WeightedEstimate;

/// A decoded next-value estimate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Estimate {
    /// The single most likely next value
    Scalar(i64),

    /// Probability-weighted candidates as returned by the service
    Weighted(Vec<WeightedEstimate>),
}

impl Estimate {
    pub fn as_scalar(&self) -> Option<i64> {
        match self {
            Estimate::Scalar(v) => Some(*v),
            Estimate::Weighted(_) => None,
        }
    }

    /// The leading candidate: the scalar itself, or the first weighted entry.
    pub fn top(&self) -> Option<i64> {
        match self {
            Estimate::Scalar(v) => Some(*v),
            Estimate::Weighted(ests) => ests.first().map(|w| w.est),
        }
    }
}

/// One delivered prediction, paired with the info supplied at send time
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub estimate: Estimate,
    pub info: Value,
}
