//! Firefox launch and profile preparation.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | Launches one Firefox window wired to the WebSocket server |
//! | [`DriverBuilder`] | Validates binary and extension paths |
//! | [`FirefoxOptions`] | Command-line flags (headless, window size) |
//! | [`Profile`] | Throwaway profile with prefs and the extension installed |

// ============================================================================
// Submodules
// ============================================================================

/// Init page handed to Firefox on startup.
pub mod assets;

/// Builder for [`Driver`].
pub mod builder;

/// Driver core.
pub mod core;

/// Firefox command-line options.
pub mod options;

/// Profile management.
pub mod profile;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DriverBuilder;
pub use core::Driver;
pub use options::FirefoxOptions;
pub use profile::{ExtensionSource, Profile};
