//! Request/response correlation over a tagged message channel
//!
//! The correlator owns the table of in-flight requests. Sends are keyed by
//! the last object of the batch; inbound messages are matched back to the
//! stored entry by the same key, so replies may arrive in any order.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::channel::Channel;
use crate::error::CorrelatorError;

use super::key::CorrelationKey;
use super::messages::{InboundEstimate, OutboundObject};

/// Message tag under which object batches travel.
pub const OBJECT_TAG: &str = "OBJECT";

/// A decoded inbound message
#[derive(Debug)]
pub enum Inbound<I> {
    /// Control/status message (carries a `"type"` field); no correlation
    /// attempted.
    Control(Value),

    /// Estimate batch matched to a pending request, paired with the info
    /// stored at send time.
    Response { batch: Vec<InboundEstimate>, info: I },
}

/// Correlator counters for observability
#[derive(Debug, Clone, Default)]
pub struct CorrelatorMetrics {
    pub objects_sent: u64,
    pub responses_matched: u64,
    pub orphans: u64,
    pub parse_failures: u64,
    pub control_messages: u64,
}

/// Matches asynchronous replies to the requests that produced them
///
/// `I` is the opaque per-request payload handed back on delivery. Entries
/// are evicted on every resolution path - matched, orphaned, or failed
/// send - so the table never outlives the exchanges it tracks.
pub struct Correlator<I> {
    channel: Arc<dyn Channel>,
    pending: HashMap<CorrelationKey, I>,
    /// Catch-all for control/status messages
    status_tx: Option<mpsc::UnboundedSender<Value>>,
    /// Catch-all for responses that match no pending entry
    unmatched_tx: Option<mpsc::UnboundedSender<Vec<InboundEstimate>>>,
    metrics: CorrelatorMetrics,
}

impl<I> Correlator<I> {
    pub fn new(channel: Arc<dyn Channel>) -> Self {
        Self {
            channel,
            pending: HashMap::new(),
            status_tx: None,
            unmatched_tx: None,
            metrics: CorrelatorMetrics::default(),
        }
    }

    /// Register a listener for control/status messages.
    pub fn set_status_hook(&mut self, tx: mpsc::UnboundedSender<Value>) {
        self.status_tx = Some(tx);
    }

    /// Register a catch-all listener for orphaned responses.
    pub fn set_unmatched_hook(&mut self, tx: mpsc::UnboundedSender<Vec<InboundEstimate>>) {
        self.unmatched_tx = Some(tx);
    }

    /// Number of requests currently in flight.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn metrics(&self) -> CorrelatorMetrics {
        self.metrics.clone()
    }

    /// Send a batch of objects, remembering `info` under the batch's key.
    ///
    /// The key is derived from the *last* element. A key that is already in
    /// flight is a protocol error: nothing is stored and nothing is sent.
    /// A channel failure rolls the entry back out of the table.
    pub async fn send_objects(
        &mut self,
        batch: &[OutboundObject],
        info: I,
    ) -> Result<(), CorrelatorError> {
        let last = batch.last().ok_or(CorrelatorError::EmptyBatch)?;
        let key = last.key();

        if self.pending.contains_key(&key) {
            warn!(%key, "send conflicts with a request still in flight");
            return Err(CorrelatorError::Conflict(key));
        }

        let payload = serde_json::to_value(batch)?;
        self.pending.insert(key, info);
        debug!(%key, pending = self.pending.len(), "sending object batch");

        if let Err(e) = self.channel.send(OBJECT_TAG, payload).await {
            warn!(%key, error = %e, "channel rejected send, releasing key");
            self.pending.remove(&key);
            return Err(CorrelatorError::Channel(e));
        }

        self.metrics.objects_sent += 1;
        Ok(())
    }

    /// Decode one raw inbound message and resolve it against the table.
    ///
    /// Control messages are forwarded to the status hook and returned as
    /// [`Inbound::Control`]. Estimate batches consume their pending entry;
    /// a batch with no entry goes to the unmatched hook (if any) and is
    /// reported as [`CorrelatorError::Orphan`].
    pub fn handle_message(&mut self, raw: &str) -> Result<Inbound<I>, CorrelatorError> {
        let data: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                self.metrics.parse_failures += 1;
                warn!(error = %e, "dropping unparseable inbound message");
                return Err(CorrelatorError::ParseFailure(e));
            }
        };

        if let Some(kind) = data.get("type") {
            self.metrics.control_messages += 1;
            debug!(%kind, "control message");
            if let Some(tx) = &self.status_tx {
                let _ = tx.send(data.clone());
            }
            return Ok(Inbound::Control(data));
        }

        let batch: Vec<InboundEstimate> = serde_json::from_value(data).map_err(|e| {
            warn!(error = %e, "response batch is missing correlation fields");
            CorrelatorError::MalformedResponse
        })?;
        let key = batch
            .last()
            .map(InboundEstimate::key)
            .ok_or(CorrelatorError::MalformedResponse)?;

        match self.pending.remove(&key) {
            Some(info) => {
                self.metrics.responses_matched += 1;
                debug!(%key, pending = self.pending.len(), "matched response");
                Ok(Inbound::Response { batch, info })
            }
            None => {
                self.metrics.orphans += 1;
                warn!(%key, "response matches no pending request");
                if let Some(tx) = &self.unmatched_tx {
                    let _ = tx.send(batch);
                }
                Err(CorrelatorError::Orphan(key))
            }
        }
    }
}
