//! Page-facing U2F object.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use crate::engine::{ProtocolEngine, RegisterCall, SignCall};

// ============================================================================
// U2fApi
// ============================================================================

/// The `u2f` object page scripts call.
///
/// Cheap to clone; all clones share one engine and therefore one pending
/// slot.
///
/// # Example
///
/// ```ignore
/// use u2f_bridge::{RegisteredKey, SignCall, SUPPORTED_VERSION};
///
/// let key = RegisteredKey::new(SUPPORTED_VERSION, "kh1")
///     .with_app_id("https://example.com")
///     .with_challenge("chal1");
///
/// let accepted = page.api().sign(SignCall::new(vec![key], |result| {
///     println!("{result:?}");
/// }));
/// ```
#[derive(Clone)]
pub struct U2fApi {
    engine: Arc<ProtocolEngine>,
}

impl U2fApi {
    /// Wraps an engine.
    #[inline]
    #[must_use]
    pub fn new(engine: Arc<ProtocolEngine>) -> Self {
        Self { engine }
    }

    /// `u2f.register([appId,] registerRequests, callback[, timeout])`.
    ///
    /// Returns `false` if rejected because another operation is pending.
    #[inline]
    pub fn register(&self, call: RegisterCall) -> bool {
        self.engine.register(call)
    }

    /// `u2f.sign([appId, challenge,] registeredKeys, callback[, timeout])`.
    ///
    /// Returns `false` if rejected because another operation is pending.
    #[inline]
    pub fn sign(&self, call: SignCall) -> bool {
        self.engine.sign(call)
    }

    /// Returns `true` if both handles drive the same engine.
    #[inline]
    #[must_use]
    pub fn same_engine(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.engine, &other.engine)
    }
}

impl fmt::Debug for U2fApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("U2fApi")
            .field("origin", self.engine.origin())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
