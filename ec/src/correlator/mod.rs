//! Request/response correlation layer
//!
//! Matches asynchronous replies to the requests that produced them using a
//! key derived from request fields the remote service echoes verbatim.
//! Correlating on echoed fields (rather than FIFO response order) tolerates
//! reordering across concurrent in-flight requests.

mod core;
mod key;
mod messages;

pub use core::{Correlator, CorrelatorMetrics, Inbound, OBJECT_TAG};
pub use key::CorrelationKey;
pub use messages::{InboundEstimate, OutboundObject, WeightedEstimate};
