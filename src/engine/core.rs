//! Request/response correlation.
//!
//! The engine owns the pending slot. Because at most one operation is ever
//! in flight, a same-origin `U2FResponse` always belongs to the operation in
//! the slot and no request IDs are needed.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::identifiers::{AppId, Origin};
use crate::protocol::{
    MessageName, ProtocolMessage, RegisterResponse, ResponsePayload, SignResponse, U2fResult,
};
use crate::transport::{PageMessage, PageSurface};

use super::call::{RegisterCall, SignCall};
use super::pending::{Callback, OperationKind, PendingOperation, PendingSlot};

// ============================================================================
// ProtocolEngine
// ============================================================================

/// Single-flight U2F protocol engine for one page.
pub struct ProtocolEngine {
    /// Origin of the hosting document.
    origin: Origin,
    /// Page message surface used to reach the adapter.
    surface: PageSurface,
    /// The one in-flight operation.
    pending: PendingSlot,
}

impl ProtocolEngine {
    /// Creates an engine for the document at `origin`.
    #[must_use]
    pub fn new(origin: Origin, surface: PageSurface) -> Self {
        Self {
            origin,
            surface,
            pending: PendingSlot::new(),
        }
    }

    /// Returns the document origin.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Returns `true` if an operation is in flight.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_occupied()
    }

    /// Claims the pending slot for a new operation.
    ///
    /// Returns `false` if another operation is already pending; the new
    /// callback is then dropped without being called.
    pub fn register_callback(
        &self,
        kind: OperationKind,
        callback: Callback,
        app_id: Option<AppId>,
    ) -> bool {
        debug!(%kind, app_id = ?app_id.as_ref().map(AppId::as_str), "Claiming pending slot");

        let operation = PendingOperation::new(kind, callback, app_id);
        match self.pending.try_occupy(operation) {
            Ok(()) => true,
            Err(rejected) => {
                warn!(kind = %rejected.kind, "Operation already pending, rejecting call");
                false
            }
        }
    }

    /// Starts a registration.
    ///
    /// Returns `false` if rejected because another operation is pending.
    /// Otherwise the callback is eventually invoked exactly once, with an
    /// error result right away if no request can be resolved from the call.
    pub fn register(&self, call: RegisterCall) -> bool {
        let (invocation, callback) = call.normalize();

        if !self.register_callback(OperationKind::Register, callback, invocation.app_id.clone()) {
            return false;
        }

        if let Some(timeout) = invocation.timeout {
            debug!(timeout_secs = timeout.as_secs(), "Timeout supplied, not enforced");
        }

        match invocation.resolve() {
            Some(payload) => self.post_to_host(ProtocolMessage::RegisterRequest(payload)),
            None => self.report_error(Some("no supported register request".into())),
        }

        true
    }

    /// Starts a signature.
    ///
    /// Same contract as [`register`](Self::register).
    pub fn sign(&self, call: SignCall) -> bool {
        let (invocation, callback) = call.normalize();

        if !self.register_callback(OperationKind::Sign, callback, invocation.app_id.clone()) {
            return false;
        }

        if let Some(timeout) = invocation.timeout {
            debug!(timeout_secs = timeout.as_secs(), "Timeout supplied, not enforced");
        }

        match invocation.resolve() {
            Some(payload) => self.post_to_host(ProtocolMessage::SignRequest(payload)),
            None => self.report_error(Some("no supported registered key".into())),
        }

        true
    }

    /// Handles one page-surface message.
    ///
    /// Only same-origin `U2FResponse` envelopes are acted upon. Any such
    /// envelope resolves the pending operation, whatever the shape of its
    /// payload.
    pub fn handle_page_message(&self, event: &PageMessage) {
        if !event.is_from(&self.origin) {
            return;
        }

        match MessageName::of(&event.data) {
            Some(MessageName::Response) => {}
            Some(MessageName::RegisterRequest | MessageName::SignRequest) | None => return,
        }

        let message = event.data.get("message").unwrap_or(&Value::Null);
        if !message.is_object() {
            warn!("Response envelope without a payload object");
        }

        self.handle_response(ResponsePayload::from_message(message));
    }

    /// Resolves the pending operation with a host response.
    pub fn handle_response(&self, payload: ResponsePayload) {
        if payload.is_error() {
            self.report_error(payload.error_text());
            return;
        }

        match payload.result {
            Some(raw) => self.report_success(&raw),
            None => self.report_error(Some("response carried no result".into())),
        }
    }

    /// Listens on the page surface until it closes.
    pub async fn listen(self: Arc<Self>, mut page_rx: broadcast::Receiver<PageMessage>) {
        loop {
            match page_rx.recv().await {
                Ok(event) => self.handle_page_message(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Engine lagged behind page surface");
                }
                Err(RecvError::Closed) => break,
            }
        }

        debug!("Engine listener terminated");
    }

    /// Builds the success result for the pending operation's kind.
    fn report_success(&self, raw: &str) {
        let Some(operation) = self.pending.take() else {
            warn!("Response received with no pending operation");
            return;
        };

        let parsed = match operation.kind {
            OperationKind::Register => RegisterResponse::from_result(raw).map(U2fResult::Register),
            OperationKind::Sign => SignResponse::from_result(raw).map(U2fResult::Sign),
        };

        let result = match parsed {
            Ok(result) => {
                info!(kind = %operation.kind, "Operation completed");
                result
            }
            Err(e) => {
                warn!(kind = %operation.kind, error = %e, "Unreadable response result");
                U2fResult::error(Some(format!("invalid response result: {e}")))
            }
        };

        operation.resolve(result);
    }

    /// Resolves the pending operation with an error result.
    fn report_error(&self, message: Option<String>) {
        let Some(operation) = self.pending.take() else {
            warn!(?message, "Error received with no pending operation");
            return;
        };

        info!(kind = %operation.kind, ?message, "Operation failed");
        operation.resolve(U2fResult::error(message));
    }

    /// Posts an outbound request for the adapter to forward.
    fn post_to_host(&self, message: ProtocolMessage) {
        let name = message.name();

        let data = match message.to_value() {
            Ok(data) => data,
            Err(e) => {
                self.report_error(Some(e.to_string()));
                return;
            }
        };

        match self.surface.post(self.origin.clone(), data) {
            Ok(()) => debug!(name = name.as_str(), "Request posted"),
            Err(e) => warn!(name = name.as_str(), error = %e, "Request not delivered"),
        }
    }
}

impl fmt::Debug for ProtocolEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolEngine")
            .field("origin", &self.origin)
            .field("pending", &self.pending.kind())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
