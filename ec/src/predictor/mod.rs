//! Sequence prediction over a correlated channel
//!
//! A [`SequencePredictor`] composes a correlator with a fixed-depth history
//! window and a two-state alternation machine:
//! - **observe:** train the remote model on a value that became known
//! - **predict_next:** request an estimate of the next value
//!
//! The first send of a session is always a prediction; training and
//! prediction then strictly alternate, with the counter's parity encoding
//! which exchange is which.

mod config;
mod core;
mod messages;

pub use config::PredictorConfig;
pub use core::{Phase, PredictorMetrics, SequencePredictor};
pub use messages::{Estimate, Prediction};
