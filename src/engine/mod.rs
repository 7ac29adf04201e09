//! Protocol engine.
//!
//! Enforces the single pending operation, normalizes the two call
//! signatures of `register` / `sign`, posts outbound requests and maps the
//! host's response back to the waiting callback.
//!
//! # Operation Lifecycle
//!
//! 1. `register` / `sign` normalize the call and claim the pending slot
//! 2. A resolvable call posts `U2FRegister` / `U2FSign`; an unresolvable one
//!    resolves immediately with an error result
//! 3. A same-origin `U2FResponse` empties the slot, then runs the callback
//!
//! A call made while the slot is taken is rejected: nothing is posted and its
//! callback is never run.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `call` | Call shapes and normalization |
//! | `core` | The engine |
//! | `pending` | Pending slot |

// ============================================================================
// Submodules
// ============================================================================

/// Call shapes and normalization.
pub mod call;

/// Request/response correlation.
pub mod core;

/// Single pending-operation slot.
pub mod pending;

// ============================================================================
// Re-exports
// ============================================================================

pub use call::{RegisterCall, SignCall};
pub use self::core::ProtocolEngine;
pub use pending::{Callback, OperationKind, PendingOperation, PendingSlot};
