//! Single pending-operation slot.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use parking_lot::Mutex;

use crate::identifiers::AppId;
use crate::protocol::U2fResult;

// ============================================================================
// Types
// ============================================================================

/// Page callback receiving the outcome of an operation.
pub type Callback = Box<dyn FnOnce(U2fResult) + Send + 'static>;

// ============================================================================
// OperationKind
// ============================================================================

/// Which operation a pending callback is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Credential registration.
    Register,
    /// Challenge signing.
    Sign,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register => f.write_str("register"),
            Self::Sign => f.write_str("sign"),
        }
    }
}

// ============================================================================
// PendingOperation
// ============================================================================

/// The in-flight operation.
pub struct PendingOperation {
    /// Requested operation.
    pub kind: OperationKind,
    /// Explicit app ID supplied by the caller, if any.
    pub app_id: Option<AppId>,
    callback: Callback,
}

impl PendingOperation {
    /// Creates a pending operation.
    #[must_use]
    pub fn new(kind: OperationKind, callback: Callback, app_id: Option<AppId>) -> Self {
        Self {
            kind,
            app_id,
            callback,
        }
    }

    /// Consumes the operation and invokes its callback.
    pub fn resolve(self, result: U2fResult) {
        (self.callback)(result);
    }
}

impl fmt::Debug for PendingOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingOperation")
            .field("kind", &self.kind)
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PendingSlot
// ============================================================================

/// Holds at most one [`PendingOperation`].
#[derive(Debug, Default)]
pub struct PendingSlot {
    inner: Mutex<Option<PendingOperation>>,
}

impl PendingSlot {
    /// Creates an empty slot.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `operation` if the slot is empty.
    ///
    /// Returns the operation back if the slot was already occupied.
    pub fn try_occupy(&self, operation: PendingOperation) -> Result<(), PendingOperation> {
        let mut slot = self.inner.lock();
        if slot.is_some() {
            return Err(operation);
        }
        *slot = Some(operation);
        Ok(())
    }

    /// Empties the slot, returning what it held.
    #[inline]
    pub fn take(&self) -> Option<PendingOperation> {
        self.inner.lock().take()
    }

    /// Returns the kind of the pending operation.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<OperationKind> {
        self.inner.lock().as_ref().map(|op| op.kind)
    }

    /// Returns `true` if an operation is pending.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.inner.lock().is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_callback(counter: &Arc<AtomicUsize>) -> Callback {
        let counter = Arc::clone(counter);
        Box::new(move |_: U2fResult| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_second_occupy_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let slot = PendingSlot::new();

        let first = PendingOperation::new(OperationKind::Sign, counting_callback(&calls), None);
        let second =
            PendingOperation::new(OperationKind::Register, counting_callback(&calls), None);

        assert!(slot.try_occupy(first).is_ok());
        let rejected = slot.try_occupy(second).unwrap_err();
        assert_eq!(rejected.kind, OperationKind::Register);
        assert_eq!(slot.kind(), Some(OperationKind::Sign));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_take_empties_slot_and_resolves_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let slot = PendingSlot::new();
        slot.try_occupy(PendingOperation::new(
            OperationKind::Register,
            counting_callback(&calls),
            Some(AppId::from("https://example.com")),
        ))
        .expect("empty slot");

        let op = slot.take().expect("pending");
        assert!(!slot.is_occupied());
        assert!(slot.take().is_none());

        op.resolve(U2fResult::error(None));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(OperationKind::Register.to_string(), "register");
        assert_eq!(OperationKind::Sign.to_string(), "sign");
    }
}
