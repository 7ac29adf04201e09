//! Error types for the U2F bridge.
//!
//! These errors cover configuration, origin parsing and the plumbing between
//! the page surface and the privileged host. Protocol outcomes that a page
//! script must observe (busy, malformed request, remote error) are never
//! raised as [`Error`]; they are delivered through the caller's callback as
//! a [`U2fResult`](crate::protocol::U2fResult).
//!
//! # Usage
//!
//! ```ignore
//! use u2f_bridge::{HostConnection, PageContext, Result};
//!
//! fn example(host: HostConnection) -> Result<()> {
//!     let page = PageContext::builder()
//!         .origin("https://example.com")
//!         .host(host)
//!         .build()?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidOrigin`] |
//! | Channel | [`Error::ChannelClosed`], [`Error::Host`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a page context is built with missing or invalid options.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Origin could not be parsed or is opaque.
    #[error("Invalid origin '{origin}': {message}")]
    InvalidOrigin {
        /// The rejected origin text.
        origin: String,
        /// Why it was rejected.
        message: String,
    },

    // ========================================================================
    // Channel Errors
    // ========================================================================
    /// The page surface or host link has no receivers left.
    #[error("Channel closed")]
    ChannelClosed,

    /// The privileged host refused a dispatched message.
    #[error("Host error: {message}")]
    Host {
        /// Description of the host failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid origin error.
    #[inline]
    pub fn invalid_origin(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOrigin {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Creates a host error.
    #[inline]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error comes from page context configuration.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::InvalidOrigin { .. })
    }

    /// Returns `true` if this error comes from the message channels.
    #[inline]
    #[must_use]
    pub fn is_channel_error(&self) -> bool {
        matches!(self, Self::ChannelClosed | Self::Host { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
