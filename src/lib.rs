//! Open Play registration bot.
//!
//! Registers for a weekly Open Play session the moment registration opens,
//! by driving a real Firefox window through the WebDriver WebExtension.
//!
//! # Architecture
//!
//! ```text
//! Scheduler ──> RegistrationJob ──> run_once ──> classify ──> drive_form
//!                    │                 │
//!                    └─ ConfigStore    └─ PageSession (Firefox window)
//! ```
//!
//! - The browser layer ([`driver`], [`transport`], [`browser`]) is a thin
//!   local end: one Firefox process, one WebSocket connection and one
//!   profile per [`Window`].
//! - [`page::PageSession`] is the only browser surface the registration
//!   logic sees; tests run it against scripted pages.
//! - A page that is full, sold out or unrecognised is a
//!   [`PageState`](classify::PageState), not an error.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use openplay_signup::config::{ConfigStore, TerminalPrompter, data_dir, merge_and_save};
//! use openplay_signup::notify::DesktopNotifier;
//! use openplay_signup::page::FirefoxLauncher;
//! use openplay_signup::runner::{RunSettings, run_once};
//! use openplay_signup::{Driver, FirefoxOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let data_dir = data_dir()?;
//!     let store = ConfigStore::in_dir(&data_dir);
//!     let config = merge_and_save(&store, &mut TerminalPrompter)?;
//!
//!     let driver = Driver::builder()
//!         .binary("/usr/bin/firefox")
//!         .extension(data_dir.join("extension.xpi"))
//!         .build()?;
//!     let launcher = FirefoxLauncher::new(driver, FirefoxOptions::new());
//!     let settings = RunSettings::new(&data_dir, Duration::from_secs(30));
//!
//!     let outcome = run_once(&config, &launcher, &DesktopNotifier, &settings).await?;
//!     println!("{:?}", outcome.status);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Browser entities: [`Window`], [`Tab`], [`Element`] |
//! | [`classify`] | Page state classifier |
//! | [`config`] | `.env` store, registration fields, settings, prompts |
//! | [`driver`] | Firefox launch and profile setup |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`form`] | Registration form driver |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`logging`] | Console and rolling file log setup |
//! | [`notify`] | Desktop notifications |
//! | [`page`] | Page capability and its Firefox adapter |
//! | [`protocol`] | WebSocket message types (internal) |
//! | [`runner`] | One registration attempt, and the weekly job |
//! | [`schedule`] | Weekly trigger, job queue, driver loop |
//! | [`transport`] | WebSocket transport layer (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Browser entities: Window, Tab, Element.
///
/// - [`Window`] - Browser window (owns Firefox process)
/// - [`Tab`] - Browser tab with frame context
/// - [`Element`] - DOM element reference
pub mod browser;

/// Page state classification.
pub mod classify;

/// Persisted configuration and interactive input.
pub mod config;

/// Firefox launch and configuration.
///
/// Use [`Driver::builder()`] to create a configured driver instance.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Registration form driver.
pub mod form;

/// Type-safe identifiers for browser entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Log stream setup.
pub mod logging;

/// User notifications.
pub mod notify;

/// Page capability interface.
pub mod page;

/// WebSocket protocol message types.
///
/// Internal module defining command/response/event structures.
pub mod protocol;

/// Run orchestration.
pub mod runner;

/// Weekly scheduling.
pub mod schedule;

/// WebSocket transport layer.
///
/// Internal module handling WebSocket server and connection management.
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{By, Element, Tab, Window};

// Driver types
pub use driver::{Driver, DriverBuilder, ExtensionSource, FirefoxOptions, Profile};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ElementId, FrameId, RequestId, SessionId, TabId};

// Registration types
pub use classify::{Classification, PageState};
pub use config::{Position, RegistrationConfig};
pub use runner::{RunOutcome, RunStatus, run_once};
