//! Envelope and tag dispatch.
//!
//! Page-surface data is untyped JSON. [`MessageName::of`] peeks at the tag so
//! listeners can drop foreign traffic before attempting a full parse, and
//! [`ProtocolMessage`] is the typed form of a recognized envelope.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

use super::request::{RegisterPayload, SignPayload};
use super::response::ResponsePayload;

// ============================================================================
// MessageName
// ============================================================================

/// Known protocol tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageName {
    /// `U2FRegister`, page to host.
    RegisterRequest,
    /// `U2FSign`, page to host.
    SignRequest,
    /// `U2FResponse`, host to page.
    Response,
}

impl MessageName {
    /// Returns the wire tag.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegisterRequest => "U2FRegister",
            Self::SignRequest => "U2FSign",
            Self::Response => "U2FResponse",
        }
    }

    /// Looks up a wire tag. Returns `None` for anything unrecognized.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "U2FRegister" => Some(Self::RegisterRequest),
            "U2FSign" => Some(Self::SignRequest),
            "U2FResponse" => Some(Self::Response),
            _ => None,
        }
    }

    /// Reads the tag of an untyped envelope.
    ///
    /// Returns `None` if `data` is not an object, has no string `name`, or the
    /// name is not a protocol tag.
    #[must_use]
    pub fn of(data: &Value) -> Option<Self> {
        data.get("name").and_then(Value::as_str).and_then(Self::parse)
    }

    /// Returns `true` for tags the page sends to the host.
    #[inline]
    #[must_use]
    pub const fn is_outbound(self) -> bool {
        matches!(self, Self::RegisterRequest | Self::SignRequest)
    }
}

// ============================================================================
// ProtocolMessage
// ============================================================================

/// A recognized protocol envelope.
///
/// # Format
///
/// ```json
/// {
///   "name": "U2FSign",
///   "message": { "appId": "...", "challenge": "...", "keyHandle": "..." }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "message")]
pub enum ProtocolMessage {
    /// Register a new credential.
    #[serde(rename = "U2FRegister")]
    RegisterRequest(RegisterPayload),

    /// Sign a challenge with an existing credential.
    #[serde(rename = "U2FSign")]
    SignRequest(SignPayload),

    /// Result of the pending operation.
    #[serde(rename = "U2FResponse")]
    Response(ResponsePayload),
}

impl ProtocolMessage {
    /// Returns the tag of this message.
    #[inline]
    #[must_use]
    pub fn name(&self) -> MessageName {
        match self {
            Self::RegisterRequest(_) => MessageName::RegisterRequest,
            Self::SignRequest(_) => MessageName::SignRequest,
            Self::Response(_) => MessageName::Response,
        }
    }

    /// Parses an untyped envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the tag is unknown or the
    /// payload does not match it.
    pub fn from_value(data: &Value) -> Result<Self> {
        Ok(Self::deserialize(data)?)
    }

    /// Serializes into an untyped envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Splits the envelope into tag and payload, the shape the host link
    /// carries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn into_parts(self) -> Result<(MessageName, Value)> {
        let name = self.name();
        let payload = match self {
            Self::RegisterRequest(p) => serde_json::to_value(p)?,
            Self::SignRequest(p) => serde_json::to_value(p)?,
            Self::Response(p) => serde_json::to_value(p)?,
        };
        Ok((name, payload))
    }
}

// ============================================================================
// Tests
// ============================================================================
