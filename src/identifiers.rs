//! Type-safe identifiers for the bridge.
//!
//! Newtype wrappers keep origins and credential identifiers from being mixed
//! with arbitrary strings at compile time.
//!
//! | Type | Wraps | Purpose |
//! |------|-------|---------|
//! | [`Origin`] | `scheme://host[:port]` | Page-surface origin checks |
//! | [`AppId`] | relying party string | Credential scoping |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Origin
// ============================================================================

/// Serialized web origin of a document or message sender.
///
/// Always stored in its ASCII serialization with default ports removed, so
/// two origins compare equal exactly when a browser would treat them as the
/// same origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin(String);

impl Origin {
    /// Parses an origin from a URL or an origin string.
    ///
    /// Any path, query or fragment is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrigin`] if the text is not an absolute URL or
    /// if its origin is opaque (`data:`, `file:`, ...).
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input).map_err(|e| Error::invalid_origin(input, e.to_string()))?;

        let origin = url.origin();
        if !origin.is_tuple() {
            return Err(Error::invalid_origin(input, "opaque origin"));
        }

        Ok(Self(origin.ascii_serialization()))
    }

    /// Returns the origin as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Origin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// AppId
// ============================================================================

/// Relying party identifier that scopes a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    /// Creates an app ID from any string.
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the app ID as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the app ID is the empty string.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for AppId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AppId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
