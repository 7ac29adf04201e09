//! Page-facing call shapes and their normalization.
//!
//! `register` and `sign` each accept a current signature and a legacy one
//! that prepends explicit arguments. Both shapes are explicit variants here
//! and reduce to a single invocation type the engine consumes:
//!
//! | Call | Current | Legacy |
//! |------|---------|--------|
//! | register | `(registerRequests, callback[, timeout])` | `(appId, registerRequests, callback[, timeout])` |
//! | sign | `(registeredKeys, callback[, timeout])` | `(appId, challenge, registeredKeys, callback[, timeout])` |

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::identifiers::AppId;
use crate::protocol::{RegisterPayload, RegisterRequestEntry, RegisteredKey, SignPayload, U2fResult};

use super::pending::Callback;

// ============================================================================
// RegisterCall
// ============================================================================

/// Arguments of a `register` call.
pub enum RegisterCall {
    /// `register(registerRequests, callback[, timeout])`.
    Current {
        /// Candidate requests, one per protocol version.
        register_requests: Vec<RegisterRequestEntry>,
        /// Result callback.
        callback: Callback,
        /// Caller supplied timeout. Not enforced.
        timeout: Option<Duration>,
    },

    /// `register(appId, registerRequests, callback[, timeout])`.
    Legacy {
        /// Explicit app ID.
        app_id: Option<AppId>,
        /// Candidate requests, one per protocol version.
        register_requests: Vec<RegisterRequestEntry>,
        /// Result callback.
        callback: Callback,
        /// Caller supplied timeout. Not enforced.
        timeout: Option<Duration>,
    },
}

impl RegisterCall {
    /// Builds a current-signature call.
    #[must_use]
    pub fn new(
        register_requests: Vec<RegisterRequestEntry>,
        callback: impl FnOnce(U2fResult) + Send + 'static,
    ) -> Self {
        Self::Current {
            register_requests,
            callback: Box::new(callback),
            timeout: None,
        }
    }

    /// Builds a legacy-signature call with an explicit app ID.
    #[must_use]
    pub fn legacy(
        app_id: impl Into<AppId>,
        register_requests: Vec<RegisterRequestEntry>,
        callback: impl FnOnce(U2fResult) + Send + 'static,
    ) -> Self {
        Self::Legacy {
            app_id: Some(app_id.into()),
            register_requests,
            callback: Box::new(callback),
            timeout: None,
        }
    }

    /// Sets the timeout argument, in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        match &mut self {
            Self::Current { timeout, .. } | Self::Legacy { timeout, .. } => {
                *timeout = Some(Duration::from_secs(seconds));
            }
        }
        self
    }

    /// Reduces either shape to one invocation.
    pub(crate) fn normalize(self) -> (RegisterInvocation, Callback) {
        match self {
            Self::Current {
                register_requests,
                callback,
                timeout,
            } => (
                RegisterInvocation {
                    app_id: None,
                    register_requests,
                    timeout,
                },
                callback,
            ),

            Self::Legacy {
                app_id,
                register_requests,
                callback,
                timeout,
            } => (
                RegisterInvocation {
                    app_id: app_id.filter(|id| !id.is_empty()),
                    register_requests,
                    timeout,
                },
                callback,
            ),
        }
    }
}

/// Canonical form of a `register` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegisterInvocation {
    pub(crate) app_id: Option<AppId>,
    pub(crate) register_requests: Vec<RegisterRequestEntry>,
    pub(crate) timeout: Option<Duration>,
}

impl RegisterInvocation {
    /// Resolves the outbound payload from the first supported entry.
    ///
    /// The entry's `appId` is used only if the call gave none.
    pub(crate) fn resolve(&self) -> Option<RegisterPayload> {
        let entry = self
            .register_requests
            .iter()
            .find(|entry| entry.is_supported())?;

        let challenge = non_empty(entry.challenge.as_deref())?;
        let app_id = self
            .app_id
            .clone()
            .or_else(|| entry.app_id.clone())
            .filter(|id| !id.is_empty())?;

        Some(RegisterPayload {
            app_id,
            challenge: challenge.to_string(),
        })
    }
}

// ============================================================================
// SignCall
// ============================================================================

/// Arguments of a `sign` call.
pub enum SignCall {
    /// `sign(registeredKeys, callback[, timeout])`.
    Current {
        /// Candidate keys, one per credential.
        registered_keys: Vec<RegisteredKey>,
        /// Result callback.
        callback: Callback,
        /// Caller supplied timeout. Not enforced.
        timeout: Option<Duration>,
    },

    /// `sign(appId, challenge, registeredKeys, callback[, timeout])`.
    Legacy {
        /// Explicit app ID.
        app_id: Option<AppId>,
        /// Explicit challenge.
        challenge: Option<String>,
        /// Candidate keys, one per credential.
        registered_keys: Vec<RegisteredKey>,
        /// Result callback.
        callback: Callback,
        /// Caller supplied timeout. Not enforced.
        timeout: Option<Duration>,
    },
}

impl SignCall {
    /// Builds a current-signature call.
    #[must_use]
    pub fn new(
        registered_keys: Vec<RegisteredKey>,
        callback: impl FnOnce(U2fResult) + Send + 'static,
    ) -> Self {
        Self::Current {
            registered_keys,
            callback: Box::new(callback),
            timeout: None,
        }
    }

    /// Builds a legacy-signature call with explicit app ID and challenge.
    #[must_use]
    pub fn legacy(
        app_id: impl Into<AppId>,
        challenge: impl Into<String>,
        registered_keys: Vec<RegisteredKey>,
        callback: impl FnOnce(U2fResult) + Send + 'static,
    ) -> Self {
        Self::Legacy {
            app_id: Some(app_id.into()),
            challenge: Some(challenge.into()),
            registered_keys,
            callback: Box::new(callback),
            timeout: None,
        }
    }

    /// Sets the timeout argument, in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        match &mut self {
            Self::Current { timeout, .. } | Self::Legacy { timeout, .. } => {
                *timeout = Some(Duration::from_secs(seconds));
            }
        }
        self
    }

    /// Reduces either shape to one invocation.
    pub(crate) fn normalize(self) -> (SignInvocation, Callback) {
        match self {
            Self::Current {
                registered_keys,
                callback,
                timeout,
            } => (
                SignInvocation {
                    app_id: None,
                    challenge: None,
                    registered_keys,
                    timeout,
                },
                callback,
            ),

            Self::Legacy {
                app_id,
                challenge,
                registered_keys,
                callback,
                timeout,
            } => (
                SignInvocation {
                    app_id: app_id.filter(|id| !id.is_empty()),
                    challenge: challenge.filter(|c| !c.is_empty()),
                    registered_keys,
                    timeout,
                },
                callback,
            ),
        }
    }
}

/// Canonical form of a `sign` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SignInvocation {
    pub(crate) app_id: Option<AppId>,
    pub(crate) challenge: Option<String>,
    pub(crate) registered_keys: Vec<RegisteredKey>,
    pub(crate) timeout: Option<Duration>,
}

impl SignInvocation {
    /// Resolves the outbound payload from the first supported key.
    ///
    /// The key handle always comes from that key. App ID and challenge come
    /// from it as a pair unless the call supplied both.
    pub(crate) fn resolve(&self) -> Option<SignPayload> {
        let key = self.registered_keys.iter().find(|key| key.is_supported())?;

        let (app_id, challenge) = match (&self.app_id, &self.challenge) {
            (Some(app_id), Some(challenge)) => (Some(app_id.clone()), Some(challenge.clone())),
            _ => (key.app_id.clone(), key.challenge.clone()),
        };

        let key_handle = non_empty(key.key_handle.as_deref())?;
        let app_id = app_id.filter(|id| !id.is_empty())?;
        let challenge = challenge.filter(|c| !c.is_empty())?;

        Some(SignPayload {
            app_id,
            challenge,
            key_handle: key_handle.to_string(),
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

#[inline]
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

// ============================================================================
// Tests
// ============================================================================
