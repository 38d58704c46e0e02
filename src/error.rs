//! Error types for the registration bot.
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`].
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::ConfigIncomplete`], [`Error::Prompt`] |
//! | Browser | [`Error::Profile`], [`Error::FirefoxNotFound`], [`Error::ProcessLaunchFailed`], [`Error::SessionUnavailable`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Protocol`] |
//! | Element | [`Error::ElementNotFound`], [`Error::FrameNotAttached`] |
//! | Execution | [`Error::Timeout`], [`Error::RequestTimeout`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`], [`Error::Url`], [`Error::Dotenv`] |
//!
//! Page states such as "at capacity" or "page failed to load" are not errors;
//! they are [`PageState`](crate::classify::PageState) values. Errors here are
//! genuine faults: a bounded wait that expired, a control that could not be
//! found while driving the form, or a browser that never came up.

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::identifiers::{FrameId, RequestId, TabId};

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when a stored or supplied setting is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// A required registration field is empty.
    ///
    /// Recovered locally by prompting; only surfaces when no prompt is
    /// available.
    #[error("Configuration incomplete: {field} is not set")]
    ConfigIncomplete {
        /// Store key of the missing field.
        field: &'static str,
    },

    /// Interactive input failed (closed stdin, no terminal).
    #[error("Prompt failed: {message}")]
    Prompt {
        /// Description of the prompt failure.
        message: String,
    },

    // ========================================================================
    // Browser Errors
    // ========================================================================
    /// Profile error.
    ///
    /// Returned when Firefox profile creation or setup fails.
    #[error("Profile error: {message}")]
    Profile {
        /// Description of the profile error.
        message: String,
    },

    /// Firefox binary not found at path.
    #[error("Firefox not found at: {path}")]
    FirefoxNotFound {
        /// Path where Firefox was expected.
        path: PathBuf,
    },

    /// Failed to launch Firefox process.
    #[error("Failed to launch Firefox: {message}")]
    ProcessLaunchFailed {
        /// Description of the launch failure.
        message: String,
    },

    /// The browser session could not be acquired at all.
    ///
    /// This is the only failure a registration attempt propagates.
    #[error("Browser session unavailable: {message}")]
    SessionUnavailable {
        /// Underlying launch failure.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection timeout waiting for the extension.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// WebSocket connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or error response from the extension.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Element Errors
    // ========================================================================
    /// Element not found by locator.
    #[error("Element not found: selector={selector}, tab={tab_id}, frame={frame_id}")]
    ElementNotFound {
        /// Locator used, as `strategy:value`.
        selector: String,
        /// Tab where search was performed.
        tab_id: TabId,
        /// Frame where search was performed.
        frame_id: FrameId,
    },

    /// A frame-scoped operation ran before the embedded frame was attached.
    #[error("Embedded frame not attached")]
    FrameNotAttached,

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Bounded wait exceeded.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Command request timeout.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// URL parse error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// `.env` store parse error.
    #[error("Config store error: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a missing-field error.
    #[inline]
    pub fn config_incomplete(field: &'static str) -> Self {
        Self::ConfigIncomplete { field }
    }

    /// Creates a prompt error.
    #[inline]
    pub fn prompt(message: impl Into<String>) -> Self {
        Self::Prompt {
            message: message.into(),
        }
    }

    /// Creates a profile error.
    #[inline]
    pub fn profile(message: impl Into<String>) -> Self {
        Self::Profile {
            message: message.into(),
        }
    }

    /// Creates a Firefox not found error.
    #[inline]
    pub fn firefox_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FirefoxNotFound { path: path.into() }
    }

    /// Creates a process launch failed error.
    #[inline]
    pub fn process_launch_failed(err: IoError) -> Self {
        Self::ProcessLaunchFailed {
            message: err.to_string(),
        }
    }

    /// Wraps any launch failure as an unavailable session.
    #[inline]
    pub fn session_unavailable(cause: impl std::fmt::Display) -> Self {
        Self::SessionUnavailable {
            message: cause.to_string(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an element not found error.
    #[inline]
    pub fn element_not_found(
        selector: impl Into<String>,
        tab_id: TabId,
        frame_id: FrameId,
    ) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
            tab_id,
            frame_id,
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if a bounded wait expired.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::Timeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if an expected control was missing.
    #[inline]
    #[must_use]
    pub fn is_element_error(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::FrameNotAttached
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if the browser session itself could not be acquired.
    #[inline]
    #[must_use]
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::SessionUnavailable { .. }
                | Self::FirefoxNotFound { .. }
                | Self::ProcessLaunchFailed { .. }
                | Self::Profile { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "Connection failed: failed to connect");
    }

    #[test]
    fn test_config_incomplete_display() {
        let err = Error::config_incomplete("URL");
        assert_eq!(err.to_string(), "Configuration incomplete: URL is not set");
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::timeout("wait_for(css:iframe)", 30_000);
        let other_err = Error::connection("test");

        assert!(timeout_err.is_timeout());
        assert!(Error::connection_timeout(5000).is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_element_error() {
        let err = Error::element_not_found("css:#reg-fa", TabId::INITIAL, FrameId::main());
        assert!(err.is_element_error());
        assert!(Error::FrameNotAttached.is_element_error());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("test").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_is_session_error() {
        assert!(Error::session_unavailable("no firefox").is_session_error());
        assert!(Error::firefox_not_found("/nope").is_session_error());
        assert!(!Error::timeout("x", 1).is_session_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_url_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err, Error::Url(_)));
    }
}
