//! Builder pattern for page context configuration.
//!
//! # Example
//!
//! ```no_run
//! use u2f_bridge::{HostConnection, PageContext};
//!
//! # async fn example() -> u2f_bridge::Result<()> {
//! let (host, _endpoint) = HostConnection::channel();
//!
//! let page = PageContext::builder()
//!     .origin("https://example.com/login")
//!     .host(host)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::api::ApiBinding;
use crate::error::{Error, Result};
use crate::identifiers::Origin;
use crate::transport::HostConnection;

use super::core::PageContext;

// ============================================================================
// Constants
// ============================================================================

/// Default number of undelivered messages buffered per surface listener.
pub const DEFAULT_SURFACE_CAPACITY: usize = 64;

// ============================================================================
// PageContextBuilder
// ============================================================================

/// Builder for a [`PageContext`].
///
/// Use [`PageContext::builder()`] to create a new builder.
#[derive(Debug)]
pub struct PageContextBuilder {
    /// Document URL or origin.
    origin: Option<String>,
    /// Privileged host connection.
    host: Option<HostConnection>,
    /// Page surface buffer size.
    surface_capacity: usize,
    /// Existing `u2f` binding to install into.
    binding: Option<Arc<ApiBinding>>,
}

impl Default for PageContextBuilder {
    fn default() -> Self {
        Self {
            origin: None,
            host: None,
            surface_capacity: DEFAULT_SURFACE_CAPACITY,
            binding: None,
        }
    }
}

// ============================================================================
// PageContextBuilder Implementation
// ============================================================================

impl PageContextBuilder {
    /// Creates a builder with no origin and no host.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document URL or origin.
    ///
    /// # Arguments
    ///
    /// * `origin` - Document URL (e.g., "https://example.com/login")
    #[inline]
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Sets the privileged host connection.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: HostConnection) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets how many undelivered messages each surface listener buffers.
    ///
    /// A listener that falls further behind skips the oldest messages. A
    /// skipped `U2FSign` or `U2FResponse` is never retried, so the pending
    /// operation then stays open until the page is dropped. Size this for
    /// the page's own traffic on the surface, not just the bridge's.
    #[inline]
    #[must_use]
    pub fn surface_capacity(mut self, capacity: usize) -> Self {
        self.surface_capacity = capacity;
        self
    }

    /// Installs into an existing binding instead of a fresh one.
    ///
    /// Whatever page code assigned to the binding beforehand is replaced
    /// once at install; later assignments are ignored.
    #[inline]
    #[must_use]
    pub fn binding(mut self, binding: Arc<ApiBinding>) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Builds the page context and starts its listeners.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if origin or host is not set
    /// - [`Error::InvalidOrigin`] if the origin does not parse
    /// - [`Error::Config`] if the surface capacity is zero
    /// - [`Error::Config`] if called outside a tokio runtime
    pub fn build(self) -> Result<PageContext> {
        let origin = self.validate_origin()?;
        let capacity = self.validate_capacity()?;
        let runtime = Self::validate_runtime()?;
        let host = self.host.ok_or_else(|| {
            Error::config(
                "Host connection is required. Use .host() to set it.\n\
                 Example: PageContext::builder().host(HostConnection::channel().0)",
            )
        })?;

        let binding = self.binding.unwrap_or_default();

        Ok(PageContext::start(origin, host, capacity, binding, &runtime))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl PageContextBuilder {
    /// Validates the origin configuration.
    fn validate_origin(&self) -> Result<Origin> {
        let origin = self.origin.as_deref().ok_or_else(|| {
            Error::config(
                "Document origin is required. Use .origin() to set it.\n\
                 Example: PageContext::builder().origin(\"https://example.com\")",
            )
        })?;

        Origin::parse(origin)
    }

    /// Validates the surface capacity.
    fn validate_capacity(&self) -> Result<usize> {
        if self.surface_capacity == 0 {
            return Err(Error::config("Surface capacity must be greater than zero"));
        }
        Ok(self.surface_capacity)
    }

    /// Ensures listeners can be spawned.
    fn validate_runtime() -> Result<Handle> {
        Handle::try_current().map_err(|e| {
            Error::config(format!("PageContext must be built inside a tokio runtime: {e}"))
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_defaults() {
        let builder = PageContextBuilder::new();
        assert!(builder.origin.is_none());
        assert!(builder.host.is_none());
        assert!(builder.binding.is_none());
        assert_eq!(builder.surface_capacity, DEFAULT_SURFACE_CAPACITY);
    }

    #[test]
    fn test_setters() {
        let (host, _endpoint) = HostConnection::channel();
        let builder = PageContextBuilder::new()
            .origin("https://example.com")
            .host(host)
            .surface_capacity(8);

        assert_eq!(builder.origin.as_deref(), Some("https://example.com"));
        assert!(builder.host.is_some());
        assert_eq!(builder.surface_capacity, 8);
    }

    #[tokio::test]
    async fn test_build_fails_without_origin() {
        let (host, _endpoint) = HostConnection::channel();
        let err = PageContextBuilder::new().host(host).build().unwrap_err();
        assert!(err.to_string().contains("origin"));
    }

    #[tokio::test]
    async fn test_build_fails_without_host() {
        let err = PageContextBuilder::new()
            .origin("https://example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Host connection"));
    }

    #[tokio::test]
    async fn test_build_fails_with_bad_origin() {
        let (host, _endpoint) = HostConnection::channel();
        let err = PageContextBuilder::new()
            .origin("not a url")
            .host(host)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOrigin { .. }));
    }

    #[tokio::test]
    async fn test_build_fails_with_zero_capacity() {
        let (host, _endpoint) = HostConnection::channel();
        let err = PageContextBuilder::new()
            .origin("https://example.com")
            .host(host)
            .surface_capacity(0)
            .build()
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_build_fails_outside_runtime() {
        let (host, _endpoint) = HostConnection::channel();
        let err = PageContextBuilder::new()
            .origin("https://example.com")
            .host(host)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("tokio runtime"));
    }

    #[tokio::test]
    async fn test_build_succeeds() {
        let (host, _endpoint) = HostConnection::channel();
        let page = PageContextBuilder::new()
            .origin("https://example.com/login")
            .host(host)
            .build()
            .expect("build");
        assert_eq!(page.origin().as_str(), "https://example.com");
    }
}
