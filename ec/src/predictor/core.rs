//! Alternating train/predict state machine over a correlator
//!
//! The predictor keeps a fixed-depth window of observed values and speaks
//! a strict alternation protocol with the remote service: the first send
//! of a session is a prediction (`cnt == 0`), then training and prediction
//! sends alternate. The counter's parity encodes which is which, so the
//! response side can suppress training acknowledgments without any extra
//! bookkeeping.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::channel::Channel;
use crate::correlator::{Correlator, CorrelatorMetrics, Inbound, InboundEstimate, OutboundObject};
use crate::error::PredictorError;

use super::config::PredictorConfig;
use super::messages::{Estimate, Prediction};

/// Which call the alternation protocol expects next
///
/// Transitions happen only on a successful send, so a rejected or failed
/// call never advances the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Even counter: the next send must be a prediction
    ExpectPrediction,
    /// Odd counter: the next send must carry a training value
    ExpectTraining,
}

impl Phase {
    fn flip(self) -> Self {
        match self {
            Phase::ExpectPrediction => Phase::ExpectTraining,
            Phase::ExpectTraining => Phase::ExpectPrediction,
        }
    }

    /// The call the consumer should have made instead.
    fn expected_call(self) -> &'static str {
        match self {
            Phase::ExpectPrediction => "predict_next",
            Phase::ExpectTraining => "observe",
        }
    }
}

/// Predictor counters for observability
#[derive(Debug, Clone, Default)]
pub struct PredictorMetrics {
    pub trainings_sent: u64,
    pub predictions_sent: u64,
    pub predictions_delivered: u64,
    pub training_acks: u64,
    pub malformed_estimates: u64,
}

/// Stateful sequence-prediction client
///
/// Two entry points drive the protocol: [`observe`](Self::observe) trains
/// the remote model on a value that became known, and
/// [`predict_next`](Self::predict_next) asks for the next one. Both are
/// no-ops until the history window has filled to `depth`. Decoded
/// predictions are delivered through the mpsc sender supplied at
/// construction; training acknowledgments never reach the consumer.
pub struct SequencePredictor {
    config: PredictorConfig,
    history: VecDeque<i64>,
    cnt: u16,
    phase: Phase,
    correlator: Correlator<Value>,
    prediction_tx: mpsc::UnboundedSender<Prediction>,
    metrics: PredictorMetrics,
}

impl std::fmt::Debug for SequencePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequencePredictor")
            .field("config", &self.config)
            .field("history", &self.history)
            .field("cnt", &self.cnt)
            .field("phase", &self.phase)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl SequencePredictor {
    pub fn new(
        config: PredictorConfig,
        channel: Arc<dyn Channel>,
        prediction_tx: mpsc::UnboundedSender<Prediction>,
    ) -> Result<Self, PredictorError> {
        config.validate()?;
        debug!(
            depth = config.depth,
            prob = config.prob,
            rid = config.rid,
            "creating sequence predictor"
        );
        Ok(Self {
            history: VecDeque::with_capacity(config.depth),
            config,
            cnt: 0,
            phase: Phase::ExpectPrediction,
            correlator: Correlator::new(channel),
            prediction_tx,
            metrics: PredictorMetrics::default(),
        })
    }

    /// Current window contents, oldest first.
    pub fn history(&self) -> Vec<i64> {
        self.history.iter().copied().collect()
    }

    pub fn cnt(&self) -> u16 {
        self.cnt
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn metrics(&self) -> PredictorMetrics {
        self.metrics.clone()
    }

    pub fn correlator_metrics(&self) -> CorrelatorMetrics {
        self.correlator.metrics()
    }

    /// Register a listener for control/status messages from the service.
    pub fn set_status_hook(&mut self, tx: mpsc::UnboundedSender<Value>) {
        self.correlator.set_status_hook(tx);
    }

    /// Register a catch-all listener for orphaned responses.
    pub fn set_unmatched_hook(&mut self, tx: mpsc::UnboundedSender<Vec<InboundEstimate>>) {
        self.correlator.set_unmatched_hook(tx);
    }

    /// Record an observed value and train the remote model on it.
    ///
    /// Returns `Ok(false)` while the window is still filling (the value is
    /// recorded, nothing is sent). Once full, this must strictly alternate
    /// with [`predict_next`](Self::predict_next); the window keeps the
    /// pre-send history for the training object and admits the new value
    /// only after the send is accepted.
    pub async fn observe(&mut self, value: i64) -> Result<bool, PredictorError> {
        if self.history.len() < self.config.depth {
            self.history.push_back(value);
            debug!(
                value,
                filled = self.history.len(),
                depth = self.config.depth,
                "window still filling"
            );
            return Ok(false);
        }

        if self.phase != Phase::ExpectTraining {
            warn!(cnt = self.cnt, "observe called while a prediction is due");
            return Err(PredictorError::AlternationViolation {
                expected: self.phase.expected_call(),
                cnt: self.cnt,
            });
        }

        self.send_object(Some(value)).await?;
        self.history.pop_front();
        self.history.push_back(value);
        self.metrics.trainings_sent += 1;
        Ok(true)
    }

    /// Ask the remote model for the next value.
    ///
    /// Returns `Ok(false)` while the window is still filling. The window is
    /// not modified: no new observed value exists yet. The answer arrives
    /// later through [`handle_message`](Self::handle_message).
    pub async fn predict_next(&mut self) -> Result<bool, PredictorError> {
        if self.history.len() < self.config.depth {
            debug!(
                filled = self.history.len(),
                depth = self.config.depth,
                "window still filling, prediction skipped"
            );
            return Ok(false);
        }

        if self.phase != Phase::ExpectPrediction {
            warn!(cnt = self.cnt, "predict_next called while training is due");
            return Err(PredictorError::AlternationViolation {
                expected: self.phase.expected_call(),
                cnt: self.cnt,
            });
        }

        self.send_object(None).await?;
        self.metrics.predictions_sent += 1;
        Ok(true)
    }

    async fn send_object(&mut self, train: Option<i64>) -> Result<(), PredictorError> {
        let obj = OutboundObject {
            vars: self.history.iter().copied().collect(),
            reset: self.cnt == 0,
            uid: self.config.uid,
            rid: self.config.rid,
            prob: self.config.prob,
            cnt: self.cnt,
            train,
        };
        self.correlator.send_objects(&[obj], Value::Null).await?;

        // Counter and phase advance only once the send is accepted.
        self.cnt = self.cnt.wrapping_add(1);
        self.phase = self.phase.flip();
        Ok(())
    }

    /// Feed one raw inbound message from the channel into the client.
    ///
    /// Training acknowledgments and control messages resolve to `Ok(None)`.
    /// A decoded prediction is delivered to the consumer sender and also
    /// returned. Malformed input never disturbs the window or the counter.
    pub fn handle_message(&mut self, raw: &str) -> Result<Option<Prediction>, PredictorError> {
        let (batch, info) = match self.correlator.handle_message(raw)? {
            Inbound::Control(_) => return Ok(None),
            Inbound::Response { batch, info } => (batch, info),
        };

        if batch.len() != 1 {
            self.metrics.malformed_estimates += 1;
            warn!(len = batch.len(), "estimate batch has unexpected size");
            return Err(PredictorError::MalformedEstimate(format!(
                "expected one estimate, got {}",
                batch.len()
            )));
        }
        let resp = &batch[0];

        if resp.cnt % 2 == 1 {
            // Odd counters are training exchanges; their acknowledgments
            // never reach the consumer.
            self.metrics.training_acks += 1;
            debug!(cnt = resp.cnt, "suppressing training acknowledgment");
            return Ok(None);
        }

        let estimate = if self.config.prob {
            match &resp.ests {
                Some(ests) => Estimate::Weighted(ests.clone()),
                None => {
                    self.metrics.malformed_estimates += 1;
                    warn!(cnt = resp.cnt, "probabilistic response carries no ests");
                    return Err(PredictorError::MalformedEstimate(
                        "prediction response carries no ests field".to_string(),
                    ));
                }
            }
        } else {
            match resp.est {
                Some(est) => Estimate::Scalar(est),
                None => {
                    self.metrics.malformed_estimates += 1;
                    warn!(cnt = resp.cnt, "prediction response carries no est");
                    return Err(PredictorError::MalformedEstimate(
                        "prediction response carries no est field".to_string(),
                    ));
                }
            }
        };

        let prediction = Prediction { estimate, info };
        self.metrics.predictions_delivered += 1;
        debug!(cnt = resp.cnt, "delivering prediction");
        // Fire-and-forget: a departed consumer is not a protocol failure.
        let _ = self.prediction_tx.send(prediction.clone());
        Ok(Some(prediction))
    }
}
