//! U2F Bridge - page-side FIDO U2F API backed by a privileged token host.
//!
//! This library provides the `u2f` object a web page calls to register a
//! security key or sign a challenge, and relays those requests to a
//! privileged host (browser extension) that talks to the physical token.
//!
//! # Architecture
//!
//! The bridge follows a page/host model:
//!
//! - **Page (Rust API)**: [`U2fApi`] → [`ProtocolEngine`] → page surface
//! - **Host (Extension)**: receives `U2FRegister` / `U2FSign`, answers with
//!   `U2FResponse`
//!
//! Key design principles:
//!
//! - At most one operation in flight; a second call is rejected, not queued
//! - Responses correlate by the single pending slot, no request IDs
//! - Only same-origin, protocol-tagged messages are ever interpreted
//! - Every accepted call reaches its callback exactly once
//!
//! # Quick Start
//!
//! ```no_run
//! use u2f_bridge::{HostConnection, PageContext, RegisteredKey, Result, SignCall, SUPPORTED_VERSION};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let (host, _endpoint) = HostConnection::channel();
//!
//!     let page = PageContext::builder()
//!         .origin("https://example.com")
//!         .host(host)
//!         .build()?;
//!
//!     let key = RegisteredKey::new(SUPPORTED_VERSION, "kh1")
//!         .with_app_id("https://example.com")
//!         .with_challenge("chal1");
//!
//!     page.api().sign(SignCall::new(vec![key], |result| {
//!         println!("sign finished: {result:?}");
//!     }));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Page-facing [`U2fApi`] and its [`ApiBinding`] |
//! | [`engine`] | [`ProtocolEngine`], pending slot, call normalization |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | [`Origin`] and [`AppId`] |
//! | [`page`] | [`PageContext`] and its builder |
//! | [`protocol`] | Wire message types |
//! | [`transport`] | Page surface, host link, [`ChannelAdapter`] |

// ============================================================================
// Modules
// ============================================================================

/// Page-facing API surface.
///
/// - [`U2fApi`] - the `register` / `sign` object
/// - [`ApiBinding`] - install-once holder for it
pub mod api;

/// Protocol engine.
///
/// Owns the single pending operation and correlates responses with it.
pub mod engine;

/// Error types and result aliases.
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Page context and configuration.
///
/// Use [`PageContext::builder()`] to create a configured page.
pub mod page;

/// Bridge protocol message types.
pub mod protocol;

/// Message transport between page and host.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// API types
pub use api::{ApiBinding, U2fApi};

// Engine types
pub use engine::{Callback, OperationKind, ProtocolEngine, RegisterCall, SignCall};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{AppId, Origin};

// Page types
pub use page::{PageContext, PageContextBuilder};

// Protocol types
pub use protocol::{
    ErrorResponse, MessageName, ProtocolMessage, RegisterPayload, RegisterRequestEntry,
    RegisterResponse, RegisteredKey, ResponsePayload, SUPPORTED_VERSION, SignPayload,
    SignResponse, U2fResult,
};

// Transport types
pub use transport::{
    ChannelAdapter, ChannelHost, HostConnection, HostEndpoint, HostLink, HostMessage,
    PageMessage, PageSurface,
};
