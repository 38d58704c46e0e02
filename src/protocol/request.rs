//! Request and Response message types.
//!
//! Request: `{ "id", "method", "tabId", "frameId", "params" }`.
//! Response: `{ "id", "type": "success" | "error", "result" | "error" + "message" }`.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::{FrameId, RequestId, TabId};

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A command addressed to one tab and frame.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Correlation id.
    pub id: RequestId,

    /// Target tab.
    #[serde(rename = "tabId")]
    pub tab_id: TabId,

    /// Target frame (0 = top-level document).
    #[serde(rename = "frameId")]
    pub frame_id: FrameId,

    /// Method and params.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a request with a fresh id.
    #[inline]
    #[must_use]
    pub fn new(tab_id: TabId, frame_id: FrameId, command: Command) -> Self {
        Self {
            id: RequestId::generate(),
            tab_id,
            frame_id,
            command,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// Reply to a [`Request`] with the same `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the request id.
    pub id: RequestId,

    /// Success or error.
    #[serde(rename = "type")]
    pub response_type: ResponseType,

    /// Result payload on success.
    #[serde(default)]
    pub result: Option<Value>,

    /// Error code on failure.
    #[serde(default)]
    pub error: Option<String>,

    /// Human-readable error message on failure.
    #[serde(default)]
    pub message: Option<String>,
}

impl Response {
    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.response_type == ResponseType::Success
    }

    /// Passes success responses through and turns error responses into
    /// [`Error::Protocol`] carrying the remote code and message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] for error responses.
    pub fn into_success(self) -> Result<Self> {
        match self.response_type {
            ResponseType::Success => Ok(self),
            ResponseType::Error => {
                let code = self.error.unwrap_or_else(|| "unknown error".to_string());
                let message = self.message.unwrap_or_else(|| code.clone());
                Err(Error::protocol(format!("{code}: {message}")))
            }
        }
    }

    /// Returns `result[key]` as a string, if present.
    #[inline]
    #[must_use]
    pub fn result_str(&self, key: &str) -> Option<&str> {
        self.result.as_ref()?.get(key)?.as_str()
    }

    /// Returns `result[key]` as an unsigned integer, if present.
    #[inline]
    #[must_use]
    pub fn result_u64(&self, key: &str) -> Option<u64> {
        self.result.as_ref()?.get(key)?.as_u64()
    }
}

// ============================================================================
// ResponseType
// ============================================================================

/// Response type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Successful response.
    Success,
    /// Error response.
    Error,
}

// ============================================================================
// Tests
// ============================================================================
