//! Browser entities.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Window`] | Firefox process, connection and profile |
//! | [`Tab`] | Tab handle scoped to one frame |
//! | [`Element`] | DOM element reference |
//! | [`By`] | Element locator |

// ============================================================================
// Submodules
// ============================================================================

pub mod element;

pub mod selector;

pub mod tab;

pub mod window;

// ============================================================================
// Re-exports
// ============================================================================

pub use element::Element;
pub use selector::By;
pub use tab::Tab;
pub use window::Window;
