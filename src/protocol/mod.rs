//! Bridge protocol message types.
//!
//! This module defines the messages exchanged between the page (Rust API)
//! and the privileged host (token access) over the page message surface.
//!
//! # Protocol Overview
//!
//! | Message | Wire tag | Direction | Purpose |
//! |---------|----------|-----------|---------|
//! | `RegisterRequest` | `U2FRegister` | Page → Host | Register a new credential |
//! | `SignRequest` | `U2FSign` | Page → Host | Sign a challenge |
//! | `Response` | `U2FResponse` | Host → Page | Result of the pending operation |
//!
//! Every envelope has the shape `{"name": <tag>, "message": <payload>}`.
//! Envelopes whose `name` is not one of the tags above are foreign traffic
//! and are never interpreted.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `message` | Envelope and tag dispatch |
//! | `request` | Page-facing request entries and outbound payloads |
//! | `response` | Inbound response payload and callback results |

// ============================================================================
// Submodules
// ============================================================================

/// Envelope and tag dispatch.
pub mod message;

/// Request entries and outbound payloads.
pub mod request;

/// Response payload and callback results.
pub mod response;

// ============================================================================
// Re-exports
// ============================================================================

pub use message::{MessageName, ProtocolMessage};
pub use request::{
    RegisterPayload, RegisterRequestEntry, RegisteredKey, SUPPORTED_VERSION, SignPayload,
};
pub use response::{
    ErrorResponse, OTHER_ERROR, RegisterResponse, ResponsePayload, SignResponse, U2fResult,
};
