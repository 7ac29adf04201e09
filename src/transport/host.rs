//! Privileged host link.
//!
//! The primitive that carries messages between the page context and the
//! privileged extension is opaque to the bridge. [`HostLink`] is its outbound
//! half; inbound messages arrive on an `mpsc` receiver. [`HostConnection::channel`]
//! builds an in-process pair whose other end, [`HostEndpoint`], is what a host
//! implementation (or a test) drives.
//!
//! ```text
//! ┌──────────────┐   HostLink::dispatch    ┌──────────────┐
//! │ ChannelAdapter│ ──────────────────────► │ HostEndpoint │
//! │              │ ◄────────────────────── │  (privileged) │
//! └──────────────┘     inbound receiver    └──────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{MessageName, ProtocolMessage, ResponsePayload};

// ============================================================================
// HostMessage
// ============================================================================

/// A message crossing the privileged primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMessage {
    /// Message name (wire tag).
    pub name: String,
    /// Untyped payload.
    pub message: Value,
}

impl HostMessage {
    /// Creates a host message.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, message: Value) -> Self {
        Self {
            name: name.into(),
            message,
        }
    }

    /// Builds a host message from a typed protocol message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the payload cannot be serialized.
    pub fn from_protocol(message: ProtocolMessage) -> Result<Self> {
        let (name, payload) = message.into_parts()?;
        Ok(Self::new(name.as_str(), payload))
    }

    /// Returns the protocol tag, if the name is one.
    #[inline]
    #[must_use]
    pub fn protocol_name(&self) -> Option<MessageName> {
        MessageName::parse(&self.name)
    }

    /// Returns the page-surface envelope for this message.
    #[must_use]
    pub fn to_envelope(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "message": self.message,
        })
    }

    /// Parses this message as a typed protocol message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the name is unknown or the payload does not
    /// match it.
    pub fn to_protocol(&self) -> Result<ProtocolMessage> {
        ProtocolMessage::from_value(&self.to_envelope())
    }
}

// ============================================================================
// HostLink
// ============================================================================

/// Outbound half of the privileged primitive.
///
/// Dispatch is fire-and-forget: success only means the message was handed
/// off, never that the host will answer.
pub trait HostLink: Send + Sync {
    /// Hands `message` to the privileged side.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] or [`Error::Host`] if the message
    /// could not be handed off.
    fn dispatch(&self, message: HostMessage) -> Result<()>;
}

// ============================================================================
// ChannelHost
// ============================================================================

/// [`HostLink`] backed by an in-process `mpsc` channel.
#[derive(Debug, Clone)]
pub struct ChannelHost {
    tx: mpsc::UnboundedSender<HostMessage>,
}

impl HostLink for ChannelHost {
    fn dispatch(&self, message: HostMessage) -> Result<()> {
        self.tx.send(message).map_err(|_| Error::ChannelClosed)
    }
}

// ============================================================================
// HostConnection
// ============================================================================

/// Both halves of the privileged primitive as seen from the page context.
pub struct HostConnection {
    /// Outbound link.
    pub(crate) link: Arc<dyn HostLink>,
    /// Inbound messages from the host.
    pub(crate) inbound: mpsc::UnboundedReceiver<HostMessage>,
}

impl HostConnection {
    /// Wraps a custom link and its inbound receiver.
    #[must_use]
    pub fn new(
        link: impl HostLink + 'static,
        inbound: mpsc::UnboundedReceiver<HostMessage>,
    ) -> Self {
        Self {
            link: Arc::new(link),
            inbound,
        }
    }

    /// Creates an in-process connection and the host endpoint driving it.
    #[must_use]
    pub fn channel() -> (Self, HostEndpoint) {
        let (to_host_tx, to_host_rx) = mpsc::unbounded_channel();
        let (to_page_tx, to_page_rx) = mpsc::unbounded_channel();

        let connection = Self::new(ChannelHost { tx: to_host_tx }, to_page_rx);
        let endpoint = HostEndpoint {
            requests: to_host_rx,
            replies: to_page_tx,
        };

        (connection, endpoint)
    }
}

impl fmt::Debug for HostConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConnection").finish_non_exhaustive()
    }
}

// ============================================================================
// HostEndpoint
// ============================================================================

/// Privileged side of an in-process [`HostConnection`].
#[derive(Debug)]
pub struct HostEndpoint {
    requests: mpsc::UnboundedReceiver<HostMessage>,
    replies: mpsc::UnboundedSender<HostMessage>,
}

impl HostEndpoint {
    /// Waits for the next dispatched message.
    ///
    /// Returns `None` once the page side is gone.
    pub async fn recv(&mut self) -> Option<HostMessage> {
        self.requests.recv().await
    }

    /// Returns a dispatched message if one is already queued.
    #[must_use]
    pub fn try_recv(&mut self) -> Option<HostMessage> {
        self.requests.try_recv().ok()
    }

    /// Sends a raw message to the page side.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the page side is gone.
    pub fn send(&self, message: HostMessage) -> Result<()> {
        self.replies.send(message).map_err(|_| Error::ChannelClosed)
    }

    /// Answers the pending operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the page side is gone.
    pub fn respond(&self, payload: ResponsePayload) -> Result<()> {
        let message = HostMessage::from_protocol(ProtocolMessage::Response(payload))?;
        debug!(name = %message.name, "Host responding");
        self.send(message)
    }
}

// ============================================================================
// Tests
// ============================================================================
