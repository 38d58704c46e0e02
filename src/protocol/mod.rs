//! WebSocket protocol message types.
//!
//! Messages exchanged with the WebDriver extension running inside Firefox.
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Remote | Command request |
//! | `Response` | Remote → Local | Command response |
//! | `Event` | Remote → Local | Element / network notification |
//! | `EventReply` | Local → Remote | Decision for an intercepted event |
//!
//! Commands follow `module.methodName` format (`browsingContext.navigate`,
//! `element.find`, `network.addIntercept`).

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by module.
pub mod command;

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{BrowsingContextCommand, Command, ElementCommand, InputCommand, NetworkCommand};
pub use event::{Event, EventReply, ParsedEvent};
pub use request::{Request, Response, ResponseType};
