//! Install-once binding for the page's `u2f` object.
//!
//! Whatever a page script placed in the binding before installation is
//! replaced exactly once by [`ApiBinding::install`]. From then on the binding
//! is locked: later assignments are ignored without error, so scripts that
//! run after the bridge cannot swap in their own object.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use tracing::debug;

use super::u2f::U2fApi;

// ============================================================================
// BindingState
// ============================================================================

#[derive(Debug, Default)]
enum BindingState {
    /// Nothing bound yet.
    #[default]
    Empty,
    /// Bound by someone else, replaceable by `install`.
    Provisional(U2fApi),
    /// Installed by the bridge; read-only.
    Installed(U2fApi),
}

// ============================================================================
// ApiBinding
// ============================================================================

/// Holds the page's `u2f` object.
#[derive(Debug, Default)]
pub struct ApiBinding {
    state: Mutex<BindingState>,
}

impl ApiBinding {
    /// Creates an empty binding.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the bridge's API, replacing any provisional value.
    ///
    /// Returns `false` if an API was already installed; the installed value
    /// is kept.
    pub fn install(&self, api: U2fApi) -> bool {
        let mut state = self.state.lock();
        match *state {
            BindingState::Installed(_) => {
                debug!("u2f binding already installed");
                false
            }
            BindingState::Provisional(_) => {
                debug!("Replacing existing u2f binding");
                *state = BindingState::Installed(api);
                true
            }
            BindingState::Empty => {
                *state = BindingState::Installed(api);
                true
            }
        }
    }

    /// Assigns the binding the way an ordinary page script would.
    ///
    /// Returns `false`, leaving the binding untouched, once the bridge's API
    /// is installed.
    pub fn assign(&self, api: U2fApi) -> bool {
        let mut state = self.state.lock();
        if matches!(*state, BindingState::Installed(_)) {
            debug!("Ignoring assignment to installed u2f binding");
            return false;
        }
        *state = BindingState::Provisional(api);
        true
    }

    /// Returns the currently bound API, if any.
    #[must_use]
    pub fn get(&self) -> Option<U2fApi> {
        match &*self.state.lock() {
            BindingState::Empty => None,
            BindingState::Provisional(api) | BindingState::Installed(api) => Some(api.clone()),
        }
    }

    /// Returns `true` once the bridge's API is installed.
    #[inline]
    #[must_use]
    pub fn is_installed(&self) -> bool {
        matches!(*self.state.lock(), BindingState::Installed(_))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::ProtocolEngine;
    use crate::identifiers::Origin;
    use crate::transport::PageSurface;

    fn api() -> U2fApi {
        let origin = Origin::parse("https://example.com").expect("valid");
        U2fApi::new(Arc::new(ProtocolEngine::new(origin, PageSurface::new(4))))
    }

    #[test]
    fn test_install_into_empty() {
        let binding = ApiBinding::new();
        assert!(binding.get().is_none());

        let bridge = api();
        assert!(binding.install(bridge.clone()));
        assert!(binding.is_installed());
        assert!(binding.get().expect("bound").same_engine(&bridge));
    }

    #[test]
    fn test_install_replaces_provisional_once() {
        let binding = ApiBinding::new();
        let page_owned = api();
        assert!(binding.assign(page_owned.clone()));
        assert!(!binding.is_installed());

        let bridge = api();
        assert!(binding.install(bridge.clone()));
        assert!(!binding.install(api()));

        let bound = binding.get().expect("bound");
        assert!(bound.same_engine(&bridge));
        assert!(!bound.same_engine(&page_owned));
    }

    #[test]
    fn test_assignment_after_install_is_ignored() {
        let binding = ApiBinding::new();
        let bridge = api();
        binding.install(bridge.clone());

        assert!(!binding.assign(api()));
        assert!(binding.get().expect("bound").same_engine(&bridge));
    }
}
