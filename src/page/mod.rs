//! Page context and its configuration.
//!
//! Use [`PageContext::builder()`] to create a configured page context.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | Fluent configuration with validation |
//! | `core` | The page context |

// ============================================================================
// Submodules
// ============================================================================

/// Builder pattern for page context configuration.
pub mod builder;

/// Page context.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::PageContext;
pub use builder::{DEFAULT_SURFACE_CAPACITY, PageContextBuilder};
