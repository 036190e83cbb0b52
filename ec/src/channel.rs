//! Channel seam - the message transport the client speaks over
//!
//! The transport itself (connect, reconnect, framing) is an external
//! collaborator. This module only defines the surface the correlator needs:
//! a tagged, fire-one-message send. Inbound messages are pushed back into
//! the client by whoever owns the transport, one raw JSON string at a time.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::ChannelError;

/// An already-connected, bidirectional message transport
///
/// Delivery is assumed reliable and in-order per message; replies to
/// distinct requests may arrive in any order relative to each other.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Send a tagged JSON payload over the transport.
    async fn send(&self, tag: &str, payload: Value) -> Result<(), ChannelError>;
}

/// Normalized lifecycle hook record for a channel
///
/// Callers historically passed either a bare ready-callback or a bag of
/// callbacks; both shapes collapse into this one struct at construction
/// time instead of being sniffed at runtime. Every hook is optional and
/// fire-and-forget: an absent or departed listener is never an error.
#[derive(Debug, Default)]
pub struct ChannelHooks {
    pub on_open: Option<mpsc::UnboundedSender<()>>,
    pub on_close: Option<mpsc::UnboundedSender<()>>,
    pub on_error: Option<mpsc::UnboundedSender<String>>,
}

impl ChannelHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bare-callback form: only the ready notification is wired.
    pub fn on_open_only(tx: mpsc::UnboundedSender<()>) -> Self {
        Self {
            on_open: Some(tx),
            ..Self::default()
        }
    }

    pub fn notify_open(&self) {
        debug!("channel open");
        if let Some(tx) = &self.on_open {
            let _ = tx.send(());
        }
    }

    pub fn notify_close(&self) {
        debug!("channel closed");
        if let Some(tx) = &self.on_close {
            let _ = tx.send(());
        }
    }

    pub fn notify_error(&self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "channel error");
        if let Some(tx) = &self.on_error {
            let _ = tx.send(message);
        }
    }
}
