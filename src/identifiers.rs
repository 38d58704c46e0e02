//! Type-safe identifiers for browser entities.
//!
//! Newtype wrappers keep tab, frame, element and request ids from being
//! mixed up when they cross the WebSocket protocol.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// RequestId
// ============================================================================

/// Correlates a request with its response.
///
/// The nil UUID is reserved for the extension's READY handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a fresh random id.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the id used by the READY handshake.
    #[inline]
    #[must_use]
    pub const fn ready() -> Self {
        Self(Uuid::nil())
    }

    /// Returns `true` for the READY handshake id.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SessionId
// ============================================================================

static NEXT_SESSION: AtomicU32 = AtomicU32::new(1);

/// Identifies one Firefox window's session with the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u32);

impl SessionId {
    /// Allocates the next process-unique session id.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value sent to the extension.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// TabId
// ============================================================================

/// Firefox tab id. Always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u32);

impl TabId {
    /// Placeholder for the first tab before the handshake reports the real id.
    pub const INITIAL: TabId = TabId(1);

    /// Creates a tab id, rejecting zero.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Option<Self> {
        if id == 0 { None } else { Some(Self(id)) }
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// FrameId
// ============================================================================

/// Firefox frame id within a tab. `0` is the top-level document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(u64);

impl FrameId {
    /// Creates a frame id.
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the top-level frame id.
    #[inline]
    #[must_use]
    pub const fn main() -> Self {
        Self(0)
    }

    /// Returns `true` for the top-level frame.
    #[inline]
    #[must_use]
    pub const fn is_main(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// ElementId
// ============================================================================

/// Reference to an element held in the content script's element map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Wraps an id received from the extension.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_ready_is_nil() {
        assert!(RequestId::ready().is_ready());
        assert!(!RequestId::generate().is_ready());
    }

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionId::next();
        let b = SessionId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tab_id_rejects_zero() {
        assert!(TabId::new(0).is_none());
        assert_eq!(TabId::new(7).map(|t| t.as_u32()), Some(7));
    }

    #[test]
    fn test_frame_id_main() {
        assert!(FrameId::main().is_main());
        assert!(!FrameId::new(12).is_main());
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&ElementId::new("abc")).expect("serialize");
        assert_eq!(json, "\"abc\"");
        let json = serde_json::to_string(&FrameId::new(3)).expect("serialize");
        assert_eq!(json, "3");
    }
}
