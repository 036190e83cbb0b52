//! Estimator - correlated train/predict client for a remote
//! sequence-estimation service
//!
//! A consumer pushes a rolling window of observed categorical values to a
//! remote estimation service over an asynchronous message channel and
//! receives back predicted next values, while the remote model trains on
//! values as they become known. Requests and responses are decoupled in
//! time; a correlation key derived from request fields (echoed verbatim by
//! the service) matches each reply to the request that produced it, so
//! channel-level ordering is never relied on.
//!
//! # Core Concepts
//!
//! - **Correlation key**: `cnt:prob:rid` from the last object of a batch,
//!   unique among in-flight requests
//! - **History window**: fixed-capacity FIFO of the most recent observed
//!   values, used as model input
//! - **Alternation**: the first send is a prediction (`cnt == 0`); training
//!   and prediction sends then strictly alternate, parity-checked
//!
//! # Modules
//!
//! - [`channel`] - transport seam and lifecycle hooks
//! - [`correlator`] - in-flight request table and response matching
//! - [`predictor`] - history window and train/predict state machine
//! - [`error`] - protocol error taxonomy

pub mod channel;
pub mod correlator;
pub mod error;
pub mod predictor;

// Re-export commonly used types
pub use channel::{Channel, ChannelHooks};
pub use correlator::{
    CorrelationKey, Correlator, CorrelatorMetrics, Inbound, InboundEstimate, OBJECT_TAG,
    OutboundObject, WeightedEstimate,
};
pub use error::{ChannelError, ConfigError, CorrelatorError, PredictorError};
pub use predictor::{
    Estimate, Phase, Prediction, PredictorConfig, PredictorMetrics, SequencePredictor,
};
