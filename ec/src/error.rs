//! Protocol error taxonomy
//!
//! Every failure here is local and recoverable: callers log the error and
//! keep going. A dropped response permanently orphans nothing except its
//! own exchange; the protocol remains usable for subsequent calls.

use thiserror::Error;

use crate::correlator::CorrelationKey;

/// Errors surfaced by a [`Channel`](crate::channel::Channel) implementation
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel is closed")]
    Closed,

    #[error("transport error: {0}")]
    Io(String),
}

/// Errors from the request/response correlation layer
#[derive(Debug, Error)]
pub enum CorrelatorError {
    #[error("invalid JSON: {0}")]
    ParseFailure(#[from] serde_json::Error),

    #[error("response batch is missing correlation fields")]
    MalformedResponse,

    #[error("response key {0} matches no pending request")]
    Orphan(CorrelationKey),

    #[error("key {0} conflicts with a request still in flight")]
    Conflict(CorrelationKey),

    #[error("cannot derive a correlation key from an empty batch")]
    EmptyBatch,

    #[error("channel send failed: {0}")]
    Channel(#[from] ChannelError),
}

impl CorrelatorError {
    /// True when the remote side (or the wire) produced input we could not
    /// decode, as opposed to a local usage or transport problem.
    pub fn is_wire_error(&self) -> bool {
        matches!(
            self,
            CorrelatorError::ParseFailure(_) | CorrelatorError::MalformedResponse
        )
    }

    /// The correlation key involved, when the error is about one.
    pub fn key(&self) -> Option<CorrelationKey> {
        match self {
            CorrelatorError::Orphan(key) | CorrelatorError::Conflict(key) => Some(*key),
            _ => None,
        }
    }
}

/// Errors in predictor configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("history depth must be at least 1")]
    ZeroDepth,

    #[error("rid {0} exceeds the 7-bit identifier range")]
    RidOutOfRange(u8),
}

/// Errors from the sequence predictor
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("malformed estimate: {0}")]
    MalformedEstimate(String),

    #[error("out-of-order call: the protocol expects {expected} (cnt = {cnt})")]
    AlternationViolation { expected: &'static str, cnt: u16 },

    #[error(transparent)]
    Correlator(#[from] CorrelatorError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl PredictorError {
    /// True when the caller (not the wire) violated the protocol contract.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            PredictorError::AlternationViolation { .. } | PredictorError::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_wire_error() {
        let err = CorrelatorError::MalformedResponse;
        assert!(err.is_wire_error());

        let err = CorrelatorError::Conflict(CorrelationKey::new(4, false, 33));
        assert!(!err.is_wire_error());

        let err = CorrelatorError::Channel(ChannelError::Closed);
        assert!(!err.is_wire_error());
    }

    #[test]
    fn test_error_key() {
        let key = CorrelationKey::new(2, true, 7);
        assert_eq!(CorrelatorError::Orphan(key).key(), Some(key));
        assert_eq!(CorrelatorError::Conflict(key).key(), Some(key));
        assert_eq!(CorrelatorError::EmptyBatch.key(), None);
    }

    #[test]
    fn test_is_usage_error() {
        let err = PredictorError::AlternationViolation {
            expected: "predict_next",
            cnt: 3,
        };
        assert!(err.is_usage_error());

        let err = PredictorError::Config(ConfigError::ZeroDepth);
        assert!(err.is_usage_error());

        let err = PredictorError::MalformedEstimate("expected one estimate, got 2".to_string());
        assert!(!err.is_usage_error());
    }

    #[test]
    fn test_display_includes_key() {
        let err = CorrelatorError::Conflict(CorrelationKey::new(6, false, 33));
        assert!(err.to_string().contains("6:false:33"));
    }
}
