//! WebSocket transport layer.
//!
//! ```text
//! ┌─────────────────┐        WebSocket         ┌─────────────────┐
//! │  Window (Rust)  │◄────────────────────────►│  Extension      │
//! │  PendingServer  │     127.0.0.1:PORT       │  (background)   │
//! │  → Connection   │                          │                 │
//! └─────────────────┘                          └─────────────────┘
//! ```
//!
//! One server and one connection per launched browser window.

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// WebSocket server for Firefox communication.
pub mod server;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, EventHandler, ReadyData};
pub use server::PendingServer;
