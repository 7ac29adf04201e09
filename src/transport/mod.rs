//! Message transport between page and privileged host.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   PageSurface    ┌────────────────┐   HostLink    ┌─────────────┐
//! │ ProtocolEngine│ ◄──────────────► │ ChannelAdapter │ ◄───────────► │ Host         │
//! │  (page API)   │  origin-stamped  │ (origin check) │  name+message │ (privileged) │
//! └──────────────┘    broadcast      └────────────────┘               └─────────────┘
//! ```
//!
//! The adapter never retries and never acknowledges: a lost message looks
//! exactly like a response that has not arrived yet.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `adapter` | Origin-checked relay and its event loop |
//! | `host` | Host link trait and in-process channel pair |
//! | `surface` | Page message surface |

// ============================================================================
// Submodules
// ============================================================================

/// Origin-checked relay.
pub mod adapter;

/// Privileged host link.
pub mod host;

/// Page message surface.
pub mod surface;

// ============================================================================
// Re-exports
// ============================================================================

pub use adapter::ChannelAdapter;
pub use host::{ChannelHost, HostConnection, HostEndpoint, HostLink, HostMessage};
pub use surface::{PageMessage, PageSurface};
