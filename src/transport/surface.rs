//! Page message surface.
//!
//! Models the window message bus of a document: every posted message is
//! seen by every listener, stamped with the origin of its sender. Listeners
//! decide for themselves what to accept.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::Origin;

// ============================================================================
// PageMessage
// ============================================================================

/// One message event on the page surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMessage {
    /// Origin of the context that posted the message.
    pub origin: Origin,
    /// Untyped message data.
    pub data: Value,
}

impl PageMessage {
    /// Creates a message event.
    #[inline]
    #[must_use]
    pub fn new(origin: Origin, data: Value) -> Self {
        Self { origin, data }
    }

    /// Returns `true` if the message was posted by `origin`.
    #[inline]
    #[must_use]
    pub fn is_from(&self, origin: &Origin) -> bool {
        &self.origin == origin
    }
}

// ============================================================================
// PageSurface
// ============================================================================

/// Broadcast bus shared by the page, the adapter and the engine.
#[derive(Debug, Clone)]
pub struct PageSurface {
    tx: broadcast::Sender<PageMessage>,
}

impl PageSurface {
    /// Creates a surface buffering up to `capacity` undelivered messages per
    /// listener.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Registers a new listener.
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PageMessage> {
        self.tx.subscribe()
    }

    /// Returns the number of active listeners.
    #[inline]
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Posts `data` as sent by `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if nobody is listening.
    pub fn post(&self, origin: Origin, data: Value) -> Result<()> {
        trace!(%origin, "Posting to page surface");
        self.tx
            .send(PageMessage::new(origin, data))
            .map(|_| ())
            .map_err(|_| Error::ChannelClosed)
    }
}

// ============================================================================
// Tests
// ============================================================================
