//! Response payload and callback results.
//!
//! The host answers every request with a `U2FResponse` whose payload is a
//! [`ResponsePayload`]. The engine turns it into exactly one [`U2fResult`]
//! for the page callback.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;

use super::request::SUPPORTED_VERSION;

// ============================================================================
// Constants
// ============================================================================

/// Error code reported to page callbacks for every failure.
pub const OTHER_ERROR: u8 = 1;

// ============================================================================
// ResponsePayload
// ============================================================================

/// Payload of a `U2FResponse` message.
///
/// Parsing is lenient: the error branch is decided from the raw `error`
/// value, and fields of an unexpected type are ignored rather than failing
/// the whole payload, so a response always resolves the pending operation.
///
/// # Format
///
/// Success:
/// ```json
/// { "result": "{\"clientData\":\"...\",\"registrationData\":\"...\"}" }
/// ```
///
/// Error:
/// ```json
/// { "error": 4, "errorMessage": "device ineligible" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    /// Remote error indicator, any JSON value. See [`is_error`](Self::is_error).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,

    /// Human readable error detail. Non-string values are dropped.
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,

    /// JSON-serialized success structure. Non-string values are dropped.
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<String>,
}

impl ResponsePayload {
    /// Reads the `message` value of a `U2FResponse` envelope.
    ///
    /// Never fails. A value that is not an object yields an empty payload,
    /// which resolves as "no result".
    #[must_use]
    pub fn from_message(message: &Value) -> Self {
        Self::deserialize(message).unwrap_or_default()
    }

    /// Creates a success payload, serializing `result` into the string form
    /// the host uses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if `result` cannot be
    /// serialized.
    pub fn success(result: &impl Serialize) -> Result<Self> {
        Ok(Self {
            error: None,
            error_message: None,
            result: Some(serde_json::to_string(result)?),
        })
    }

    /// Creates an error payload with a numeric code.
    #[inline]
    #[must_use]
    pub fn error(code: i64) -> Self {
        Self {
            error: Some(Value::from(code)),
            error_message: None,
            result: None,
        }
    }

    /// Attaches an error message.
    #[inline]
    #[must_use]
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Returns `true` if the host reported a failure.
    ///
    /// Everything counts as an error except a missing value, `null`,
    /// `false`, numeric zero, `""` and `"0"`.
    #[must_use]
    pub fn is_error(&self) -> bool {
        match &self.error {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(text)) => !matches!(text.trim(), "" | "0"),
            Some(Value::Array(_) | Value::Object(_)) => true,
        }
    }

    /// Returns the message to surface with an error result, if any.
    ///
    /// An explicit `errorMessage` wins over a textual `error`.
    #[must_use]
    pub fn error_text(&self) -> Option<String> {
        self.error_message.clone().or_else(|| match &self.error {
            Some(Value::String(text)) => Some(text.clone()),
            _ => None,
        })
    }
}

fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

// ============================================================================
// U2fResult
// ============================================================================

/// Outcome delivered to a page callback.
///
/// Serializes to the plain object a page script expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum U2fResult {
    /// Successful registration.
    Register(RegisterResponse),
    /// Successful signature.
    Sign(SignResponse),
    /// Any failure.
    Error(ErrorResponse),
}

impl U2fResult {
    /// Creates an error result with an optional message.
    #[inline]
    #[must_use]
    pub fn error(message: Option<String>) -> Self {
        Self::Error(ErrorResponse::other(message))
    }

    /// Returns `true` if this is an error result.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the error code, if this is an error result.
    #[inline]
    #[must_use]
    pub fn error_code(&self) -> Option<u8> {
        match self {
            Self::Error(e) => Some(e.error_code),
            _ => None,
        }
    }
}

// ============================================================================
// RegisterResponse
// ============================================================================

/// Successful registration result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Always [`SUPPORTED_VERSION`].
    pub version: String,
    /// Client data from the host.
    pub client_data: String,
    /// Raw registration data from the token.
    pub registration_data: String,
}

/// Fields the host puts in a registration `result` string.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResult {
    client_data: String,
    registration_data: String,
}

impl RegisterResponse {
    /// Parses the host's `result` string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the string is not JSON
    /// or lacks `clientData` / `registrationData`.
    pub fn from_result(raw: &str) -> Result<Self> {
        let parsed: RegisterResult = serde_json::from_str(raw)?;
        Ok(Self {
            version: SUPPORTED_VERSION.to_string(),
            client_data: parsed.client_data,
            registration_data: parsed.registration_data,
        })
    }
}

// ============================================================================
// SignResponse
// ============================================================================

/// Successful signature result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    /// Always [`SUPPORTED_VERSION`].
    pub version: String,
    /// Client data from the host.
    pub client_data: String,
    /// Handle of the credential that signed.
    pub key_handle: String,
    /// Raw signature data from the token.
    pub signature_data: String,
}

/// Fields the host puts in a sign `result` string.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignResult {
    client_data: String,
    key_handle: String,
    signature_data: String,
}

impl SignResponse {
    /// Parses the host's `result` string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the string is not JSON
    /// or lacks `clientData` / `keyHandle` / `signatureData`.
    pub fn from_result(raw: &str) -> Result<Self> {
        let parsed: SignResult = serde_json::from_str(raw)?;
        Ok(Self {
            version: SUPPORTED_VERSION.to_string(),
            client_data: parsed.client_data,
            key_handle: parsed.key_handle,
            signature_data: parsed.signature_data,
        })
    }
}

// ============================================================================
// ErrorResponse
// ============================================================================

/// Failure result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always [`OTHER_ERROR`].
    pub error_code: u8,
    /// Optional detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ErrorResponse {
    /// Creates an [`OTHER_ERROR`] response.
    #[inline]
    #[must_use]
    pub fn other(message: Option<String>) -> Self {
        Self {
            error_code: OTHER_ERROR,
            error_message: message,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_numeric_error_detection() {
        let payload: ResponsePayload = serde_json::from_value(json!({ "error": 1 })).expect("parse");
        assert!(payload.is_error());
        assert_eq!(payload.error_text(), None);

        let payload: ResponsePayload =
            serde_json::from_value(json!({ "error": 0, "result": "{}" })).expect("parse");
        assert!(!payload.is_error());
    }

    #[test]
    fn test_textual_error_becomes_message() {
        let payload: ResponsePayload =
            serde_json::from_value(json!({ "error": "timeout" })).expect("parse");
        assert!(payload.is_error());
        assert_eq!(payload.error_text().as_deref(), Some("timeout"));
    }

    #[test]
    fn test_explicit_error_message_wins() {
        let payload = ResponsePayload::error(4).with_error_message("device ineligible");
        assert!(payload.is_error());
        assert_eq!(payload.error_text().as_deref(), Some("device ineligible"));
    }

    #[test]
    fn test_falsy_error_values_are_not_errors() {
        for error in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!("0")] {
            let payload = ResponsePayload::from_message(&json!({ "error": error, "result": "{}" }));
            assert!(!payload.is_error(), "{error} should not be an error");
        }
    }

    #[test]
    fn test_truthy_error_values_are_errors() {
        for error in [json!(true), json!(2.0), json!(-1), json!("timeout"), json!([1, 2]), json!({})] {
            let payload = ResponsePayload::from_message(&json!({ "error": error }));
            assert!(payload.is_error(), "{error} should be an error");
        }
    }

    #[test]
    fn test_mistyped_fields_do_not_fail_parse() {
        let payload = ResponsePayload::from_message(&json!({
            "error": 1,
            "errorMessage": 7,
            "result": { "clientData": "cd" }
        }));
        assert!(payload.is_error());
        assert_eq!(payload.error_message, None);
        assert_eq!(payload.result, None);
        assert_eq!(payload.error_text(), None);
    }

    #[test]
    fn test_non_object_message_is_empty_payload() {
        for message in [json!(null), json!("oops"), json!([1])] {
            assert_eq!(ResponsePayload::from_message(&message), ResponsePayload::default());
        }
    }

    #[test]
    fn test_success_payload_embeds_result_string() {
        let payload = ResponsePayload::success(&json!({ "clientData": "cd" })).expect("build");
        assert_eq!(payload.result.as_deref(), Some(r#"{"clientData":"cd"}"#));
        assert!(!payload.is_error());
    }

    #[test]
    fn test_register_response_from_result() {
        let response =
            RegisterResponse::from_result(r#"{"clientData":"cd","registrationData":"rd"}"#)
                .expect("parse");
        let value = serde_json::to_value(U2fResult::Register(response)).expect("serialize");
        assert_eq!(
            value,
            json!({ "version": "U2F_V2", "clientData": "cd", "registrationData": "rd" })
        );
    }

    #[test]
    fn test_sign_response_requires_all_fields() {
        assert!(SignResponse::from_result(r#"{"clientData":"cd","keyHandle":"kh"}"#).is_err());

        let response = SignResponse::from_result(
            r#"{"clientData":"cd","keyHandle":"kh","signatureData":"sd"}"#,
        )
        .expect("parse");
        assert_eq!(response.version, SUPPORTED_VERSION);
        assert_eq!(response.signature_data, "sd");
    }

    #[test]
    fn test_error_result_shape() {
        let value = serde_json::to_value(U2fResult::error(None)).expect("serialize");
        assert_eq!(value, json!({ "errorCode": 1 }));

        let result = U2fResult::error(Some("busy".into()));
        assert!(result.is_error());
        assert_eq!(result.error_code(), Some(OTHER_ERROR));
        let value = serde_json::to_value(result).expect("serialize");
        assert_eq!(value, json!({ "errorCode": 1, "errorMessage": "busy" }));
    }
}
