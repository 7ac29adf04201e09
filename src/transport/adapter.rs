//! Origin-checked relay between the page surface and the host link.
//!
//! # Event Loop
//!
//! [`ChannelAdapter::run`] multiplexes:
//!
//! - Page surface messages: forwarded to the host when same-origin and
//!   tagged `U2FRegister` / `U2FSign`
//! - Host messages: reposted on the page surface, stamped with the page
//!   origin, when tagged `U2FResponse`
//!
//! Anything else is dropped silently. The surface carries unrelated
//! application traffic too.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, trace, warn};

use crate::identifiers::Origin;
use crate::protocol::MessageName;

use super::host::{HostLink, HostMessage};
use super::surface::{PageMessage, PageSurface};

// ============================================================================
// ChannelAdapter
// ============================================================================

/// Bidirectional relay between one page and the privileged host.
#[derive(Clone)]
pub struct ChannelAdapter {
    /// Origin of the hosting document.
    origin: Origin,
    /// Page message surface.
    surface: PageSurface,
    /// Outbound half of the privileged primitive.
    link: Arc<dyn HostLink>,
}

impl ChannelAdapter {
    /// Creates an adapter for the document at `origin`.
    #[must_use]
    pub fn new(origin: Origin, surface: PageSurface, link: Arc<dyn HostLink>) -> Self {
        Self {
            origin,
            surface,
            link,
        }
    }

    /// Forwards a page-surface message to the host.
    ///
    /// Returns `true` if the message was handed to the host link.
    pub fn relay_to_host(&self, event: &PageMessage) -> bool {
        if !event.is_from(&self.origin) {
            trace!(origin = %event.origin, "Dropping cross-origin page message");
            return false;
        }

        let name = match MessageName::of(&event.data) {
            Some(name) if name.is_outbound() => name,
            _ => return false,
        };

        let message = HostMessage::new(
            name.as_str(),
            event.data.get("message").cloned().unwrap_or_default(),
        );

        match self.link.dispatch(message) {
            Ok(()) => {
                debug!(name = name.as_str(), "Forwarded to host");
                true
            }
            Err(e) => {
                warn!(name = name.as_str(), error = %e, "Host dispatch failed");
                false
            }
        }
    }

    /// Reposts a host message on the page surface as same-origin traffic.
    ///
    /// Returns `true` if the message was posted.
    pub fn relay_to_page(&self, message: &HostMessage) -> bool {
        match message.protocol_name() {
            Some(MessageName::Response) => {}
            Some(MessageName::RegisterRequest | MessageName::SignRequest) | None => {
                trace!(name = %message.name, "Dropping non-response host message");
                return false;
            }
        }

        match self.surface.post(self.origin.clone(), message.to_envelope()) {
            Ok(()) => {
                debug!(name = %message.name, "Relayed host message to page");
                true
            }
            Err(e) => {
                warn!(name = %message.name, error = %e, "Page surface unavailable");
                false
            }
        }
    }

    /// Runs the relay until either side closes.
    pub async fn run(
        self,
        mut page_rx: broadcast::Receiver<PageMessage>,
        mut host_rx: mpsc::UnboundedReceiver<HostMessage>,
    ) {
        loop {
            tokio::select! {
                event = page_rx.recv() => {
                    match event {
                        Ok(event) => {
                            self.relay_to_host(&event);
                        }

                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Adapter lagged behind page surface");
                        }

                        Err(RecvError::Closed) => {
                            debug!("Page surface closed");
                            break;
                        }
                    }
                }

                message = host_rx.recv() => {
                    match message {
                        Some(message) => {
                            self.relay_to_page(&message);
                        }

                        None => {
                            debug!("Host link closed");
                            break;
                        }
                    }
                }
            }
        }

        debug!("Adapter loop terminated");
    }
}

// ============================================================================
// Tests
// ============================================================================
