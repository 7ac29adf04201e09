//! Request entries and outbound payloads.
//!
//! Page scripts describe an operation with lists of [`RegisterRequestEntry`]
//! or [`RegisteredKey`], one per protocol version they can speak. The engine
//! picks the first entry for [`SUPPORTED_VERSION`] and reduces the call to a
//! [`RegisterPayload`] or [`SignPayload`] for the host.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::identifiers::AppId;

// ============================================================================
// Constants
// ============================================================================

/// The only protocol version the host speaks.
pub const SUPPORTED_VERSION: &str = "U2F_V2";

// ============================================================================
// RegisterRequestEntry
// ============================================================================

/// One entry of the `registerRequests` list passed to `register`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestEntry {
    /// Protocol version this entry targets.
    pub version: String,

    /// Registration challenge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,

    /// Per-entry app ID, used when the call supplies none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<AppId>,
}

impl RegisterRequestEntry {
    /// Creates an entry for the given version and challenge.
    #[inline]
    #[must_use]
    pub fn new(version: impl Into<String>, challenge: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            challenge: Some(challenge.into()),
            app_id: None,
        }
    }

    /// Sets the per-entry app ID.
    #[inline]
    #[must_use]
    pub fn with_app_id(mut self, app_id: impl Into<AppId>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Returns `true` if this entry targets [`SUPPORTED_VERSION`].
    #[inline]
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.version == SUPPORTED_VERSION
    }
}

// ============================================================================
// RegisteredKey
// ============================================================================

/// One entry of the `registeredKeys` list passed to `sign`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredKey {
    /// Protocol version of the credential.
    pub version: String,

    /// Handle of the previously registered credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_handle: Option<String>,

    /// Per-key app ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<AppId>,

    /// Per-key challenge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
}

impl RegisteredKey {
    /// Creates a key entry for the given version and key handle.
    #[inline]
    #[must_use]
    pub fn new(version: impl Into<String>, key_handle: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            key_handle: Some(key_handle.into()),
            app_id: None,
            challenge: None,
        }
    }

    /// Sets the per-key app ID.
    #[inline]
    #[must_use]
    pub fn with_app_id(mut self, app_id: impl Into<AppId>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Sets the per-key challenge.
    #[inline]
    #[must_use]
    pub fn with_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = Some(challenge.into());
        self
    }

    /// Returns `true` if this key uses [`SUPPORTED_VERSION`].
    #[inline]
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.version == SUPPORTED_VERSION
    }
}

// ============================================================================
// Outbound Payloads
// ============================================================================

/// Payload of a `U2FRegister` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    /// Relying party.
    pub app_id: AppId,
    /// Registration challenge.
    pub challenge: String,
}

/// Payload of a `U2FSign` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignPayload {
    /// Relying party.
    pub app_id: AppId,
    /// Challenge to sign.
    pub challenge: String,
    /// Credential to sign with.
    pub key_handle: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_register_entry_from_page_json() {
        let entry: RegisterRequestEntry = serde_json::from_value(json!({
            "version": "U2F_V2",
            "challenge": "abc",
            "appId": "https://example.com"
        }))
        .expect("parse");

        assert!(entry.is_supported());
        assert_eq!(entry.challenge.as_deref(), Some("abc"));
        assert_eq!(entry.app_id, Some(AppId::from("https://example.com")));
    }

    #[test]
    fn test_register_entry_missing_fields_default() {
        let entry: RegisterRequestEntry =
            serde_json::from_value(json!({ "version": "U2F_V1" })).expect("parse");

        assert!(!entry.is_supported());
        assert!(entry.challenge.is_none());
        assert!(entry.app_id.is_none());
    }

    #[test]
    fn test_registered_key_builder() {
        let key = RegisteredKey::new(SUPPORTED_VERSION, "kh1")
            .with_app_id("https://example.com")
            .with_challenge("chal1");

        assert!(key.is_supported());
        let value = serde_json::to_value(&key).expect("serialize");
        assert_eq!(
            value,
            json!({
                "version": "U2F_V2",
                "keyHandle": "kh1",
                "appId": "https://example.com",
                "challenge": "chal1"
            })
        );
    }

    #[test]
    fn test_register_payload_shape() {
        let payload = RegisterPayload {
            app_id: AppId::from("https://example.com"),
            challenge: "c".into(),
        };
        let value = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(value, json!({ "appId": "https://example.com", "challenge": "c" }));
    }
}
