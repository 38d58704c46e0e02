//! Event message types.
//!
//! Events flow from the extension to the local end. Intercepted network
//! events expect an [`EventReply`] carrying the decision.
//!
//! | Event | Payload |
//! |-------|---------|
//! | `element.added` | subscription match with element reference |
//! | `network.responseHeaders` | status line of an intercepted response |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::identifiers::{ElementId, FrameId, RequestId};

// ============================================================================
// Event
// ============================================================================

/// An event notification: `{ "id", "type": "event", "method", "params" }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Correlation id for an [`EventReply`].
    pub id: RequestId,

    /// Event name in `module.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        match self.method.as_str() {
            "element.added" => ParsedEvent::ElementAdded {
                strategy: self.param_str("strategy").to_string(),
                value: self.param_str("value").to_string(),
                subscription_id: self.param_str("subscriptionId").to_string(),
                element_id: ElementId::new(self.param_str("elementId")),
                frame_id: FrameId::new(self.param_u64("frameId")),
            },

            "network.responseHeaders" => ParsedEvent::ResponseHeaders {
                url: self.param_str("url").to_string(),
                status: u16::try_from(self.param_u64("status")).unwrap_or_default(),
                resource_type: self
                    .params
                    .get("resourceType")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                frame_id: FrameId::new(self.param_u64("frameId")),
            },

            _ => ParsedEvent::Unknown {
                method: self.method.clone(),
            },
        }
    }

    #[inline]
    fn param_str(&self, key: &str) -> &str {
        self.params.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    #[inline]
    fn param_u64(&self, key: &str) -> u64 {
        self.params.get(key).and_then(Value::as_u64).unwrap_or_default()
    }
}

// ============================================================================
// EventReply
// ============================================================================

/// Decision for an intercepted event:
/// `{ "id", "replyTo": "network.responseHeaders", "result": { "action": "allow" } }`.
#[derive(Debug, Clone, Serialize)]
pub struct EventReply {
    /// Matches the event id.
    pub id: RequestId,

    /// Event method being replied to.
    #[serde(rename = "replyTo")]
    pub reply_to: String,

    /// Decision payload.
    pub result: Value,
}

impl EventReply {
    /// Lets the intercepted request or response proceed unchanged.
    #[inline]
    #[must_use]
    pub fn allow(id: RequestId, reply_to: impl Into<String>) -> Self {
        Self {
            id,
            reply_to: reply_to.into(),
            result: json!({ "action": "allow" }),
        }
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Typed view of the events this crate reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEvent {
    /// An element matching a subscription appeared.
    ElementAdded {
        /// Locator strategy of the subscription.
        strategy: String,
        /// Locator value of the subscription.
        value: String,
        /// Subscription that matched.
        subscription_id: String,
        /// The new element.
        element_id: ElementId,
        /// Frame the element lives in.
        frame_id: FrameId,
    },

    /// Response headers arrived for an intercepted request.
    ResponseHeaders {
        /// Response URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// `main_frame`, `sub_frame`, `script`, ... when the extension reports it.
        resource_type: Option<String>,
        /// Frame that issued the request.
        frame_id: FrameId,
    },

    /// Any other event.
    Unknown {
        /// Event method.
        method: String,
    },
}

impl ParsedEvent {
    /// Returns `true` for a top-level document response.
    ///
    /// Falls back to the frame id when the extension omits the resource type.
    #[must_use]
    pub fn is_document_response(&self) -> bool {
        match self {
            Self::ResponseHeaders {
                resource_type: Some(kind),
                ..
            } => kind == "main_frame",
            Self::ResponseHeaders { frame_id, .. } => frame_id.is_main(),
            _ => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn event(method: &str, params: Value) -> Event {
        Event {
            id: RequestId::generate(),
            method: method.to_string(),
            params,
        }
    }

    #[test]
    fn test_parse_element_added() {
        let parsed = event(
            "element.added",
            json!({
                "strategy": "css",
                "value": "#reg-fa",
                "subscriptionId": "sub-1",
                "elementId": "el-9",
                "frameId": 0
            }),
        )
        .parse();

        assert_eq!(
            parsed,
            ParsedEvent::ElementAdded {
                strategy: "css".to_string(),
                value: "#reg-fa".to_string(),
                subscription_id: "sub-1".to_string(),
                element_id: ElementId::new("el-9"),
                frame_id: FrameId::main(),
            }
        );
    }

    #[test]
    fn test_parse_response_headers() {
        let parsed = event(
            "network.responseHeaders",
            json!({
                "url": "https://example.com/e",
                "status": 503,
                "frameId": 0,
                "resourceType": "main_frame"
            }),
        )
        .parse();

        assert!(parsed.is_document_response());
        assert!(matches!(parsed, ParsedEvent::ResponseHeaders { status: 503, .. }));
    }

    #[test]
    fn test_subresource_is_not_document() {
        let parsed = event(
            "network.responseHeaders",
            json!({
                "url": "https://cdn.example.com/a.js",
                "status": 200,
                "frameId": 0,
                "resourceType": "script"
            }),
        )
        .parse();
        assert!(!parsed.is_document_response());

        let framed = event(
            "network.responseHeaders",
            json!({ "url": "https://example.com/frame", "status": 200, "frameId": 7 }),
        )
        .parse();
        assert!(!framed.is_document_response());
    }

    #[test]
    fn test_unknown_event() {
        let parsed = event("browsingContext.load", json!({})).parse();
        assert!(matches!(parsed, ParsedEvent::Unknown { .. }));
    }

    #[test]
    fn test_event_reply_allow() {
        let id = RequestId::generate();
        let reply = EventReply::allow(id, "network.responseHeaders");
        let json = serde_json::to_value(&reply).expect("serialize");
        assert_eq!(json["replyTo"], "network.responseHeaders");
        assert_eq!(json["result"]["action"], "allow");
    }

    #[test]
    fn test_event_deserialize_ignores_type_marker() {
        let raw = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "type": "event",
            "method": "element.added",
            "params": {"elementId": "x"}
        }"#;
        let event: Event = serde_json::from_str(raw).expect("parse");
        assert_eq!(event.method, "element.added");
    }
}
