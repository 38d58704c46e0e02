//! Browser tab bound to one frame context.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Tab struct and command dispatch |
//! | `navigation` | URL navigation and document status |
//! | `frames` | Frame switching |
//! | `elements` | Element lookup and appearance waits |
//! | `screenshot` | Viewport capture |

// ============================================================================
// Submodules
// ============================================================================

mod core;
mod elements;
mod frames;
mod navigation;
mod screenshot;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::Tab;
pub(crate) use core::DocumentStatus;
