//! Public API surface.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `binding` | Install-once holder for the page's `u2f` object |
//! | `u2f` | The `register` / `sign` object |

// ============================================================================
// Submodules
// ============================================================================

/// Install-once binding.
pub mod binding;

/// Page-facing U2F object.
pub mod u2f;

// ============================================================================
// Re-exports
// ============================================================================

pub use binding::ApiBinding;
pub use u2f::U2fApi;
