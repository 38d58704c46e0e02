//! Command definitions organized by module.
//!
//! | Module | Commands used by the bot |
//! |--------|--------------------------|
//! | `browsingContext` | navigate, frame switch, screenshot |
//! | `element` | find, properties, methods, appearance subscription |
//! | `input` | text typing |
//! | `network` | response-header intercept (document status) |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::ElementId;

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands, serialized as `{ "method": ..., "params": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// BrowsingContext module commands.
    BrowsingContext(BrowsingContextCommand),
    /// Element module commands.
    Element(ElementCommand),
    /// Input module commands.
    Input(InputCommand),
    /// Network module commands.
    Network(NetworkCommand),
}

// ============================================================================
// BrowsingContext Commands
// ============================================================================

/// Navigation, frame and capture commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum BrowsingContextCommand {
    /// Navigate to URL.
    #[serde(rename = "browsingContext.navigate")]
    Navigate {
        /// URL to navigate to.
        url: String,
    },

    /// Switch to frame by iframe element reference.
    #[serde(rename = "browsingContext.switchToFrame")]
    SwitchToFrame {
        /// Element ID of the iframe.
        #[serde(rename = "elementId")]
        element_id: ElementId,
    },

    /// Capture the visible tab.
    #[serde(rename = "browsingContext.captureScreenshot")]
    CaptureScreenshot {
        /// `png` or `jpeg`.
        format: String,
        /// JPEG quality.
        #[serde(skip_serializing_if = "Option::is_none")]
        quality: Option<u8>,
    },
}

// ============================================================================
// Element Commands
// ============================================================================

/// DOM lookup and generic property access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum ElementCommand {
    /// Find a single element by locator.
    #[serde(rename = "element.find")]
    Find {
        /// Locator strategy (`css`, `text`, `xpath`, ...).
        strategy: String,
        /// Locator value.
        value: String,
        /// Parent element ID (optional).
        #[serde(rename = "parentId", skip_serializing_if = "Option::is_none")]
        parent_id: Option<ElementId>,
    },

    /// Get property via `element[name]`.
    #[serde(rename = "element.getProperty")]
    GetProperty {
        /// Element ID.
        #[serde(rename = "elementId")]
        element_id: ElementId,
        /// Property name.
        name: String,
    },

    /// Set property via `element[name] = value`.
    #[serde(rename = "element.setProperty")]
    SetProperty {
        /// Element ID.
        #[serde(rename = "elementId")]
        element_id: ElementId,
        /// Property name.
        name: String,
        /// Property value.
        value: Value,
    },

    /// Call method via `element[name](...args)`.
    #[serde(rename = "element.callMethod")]
    CallMethod {
        /// Element ID.
        #[serde(rename = "elementId")]
        element_id: ElementId,
        /// Method name.
        name: String,
        /// Method arguments.
        #[serde(default)]
        args: Vec<Value>,
    },

    /// Watch for an element matching the locator to appear.
    #[serde(rename = "element.subscribe")]
    Subscribe {
        /// Locator strategy.
        strategy: String,
        /// Locator value.
        value: String,
        /// Auto-unsubscribe after first match.
        #[serde(rename = "oneShot")]
        one_shot: bool,
        /// Remote-side timeout in milliseconds.
        #[serde(skip_serializing_if = "Option::is_none")]
        timeout: Option<u64>,
    },

    /// Stop an appearance subscription.
    #[serde(rename = "element.unsubscribe")]
    Unsubscribe {
        /// Subscription ID.
        #[serde(rename = "subscriptionId")]
        subscription_id: String,
    },
}

// ============================================================================
// Input Commands
// ============================================================================

/// Keyboard input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum InputCommand {
    /// Type text into an element, one key sequence per character.
    #[serde(rename = "input.typeText")]
    TypeText {
        /// Element ID.
        #[serde(rename = "elementId")]
        element_id: ElementId,
        /// Text to type.
        text: String,
    },
}

// ============================================================================
// Network Commands
// ============================================================================

/// Network interception.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum NetworkCommand {
    /// Add a network intercept.
    #[serde(rename = "network.addIntercept")]
    AddIntercept {
        /// Intercept outgoing requests.
        #[serde(default, rename = "interceptRequests")]
        intercept_requests: bool,
        /// Intercept response headers.
        #[serde(default, rename = "interceptResponses")]
        intercept_responses: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browsing_context_navigate() {
        let cmd = Command::BrowsingContext(BrowsingContextCommand::Navigate {
            url: "https://example.com/event".to_string(),
        });
        let json = serde_json::to_value(&cmd).expect("serialize");
        assert_eq!(json["method"], "browsingContext.navigate");
        assert_eq!(json["params"]["url"], "https://example.com/event");
    }

    #[test]
    fn test_element_find_omits_missing_parent() {
        let cmd = ElementCommand::Find {
            strategy: "css".to_string(),
            value: "#reg-fa".to_string(),
            parent_id: None,
        };
        let json = serde_json::to_value(&cmd).expect("serialize");
        assert_eq!(json["method"], "element.find");
        assert!(json["params"].get("parentId").is_none());
    }

    #[test]
    fn test_element_subscribe_field_names() {
        let cmd = ElementCommand::Subscribe {
            strategy: "css".to_string(),
            value: "iframe#monolith-iframe".to_string(),
            one_shot: true,
            timeout: Some(30_000),
        };
        let json = serde_json::to_value(&cmd).expect("serialize");
        assert_eq!(json["params"]["oneShot"], true);
        assert_eq!(json["params"]["timeout"], 30_000);
    }

    #[test]
    fn test_network_add_intercept() {
        let cmd = NetworkCommand::AddIntercept {
            intercept_requests: false,
            intercept_responses: true,
        };
        let json = serde_json::to_value(&cmd).expect("serialize");
        assert_eq!(json["method"], "network.addIntercept");
        assert_eq!(json["params"]["interceptResponses"], true);
    }

    #[test]
    fn test_screenshot_skips_quality_for_png() {
        let cmd = BrowsingContextCommand::CaptureScreenshot {
            format: "png".to_string(),
            quality: None,
        };
        let json = serde_json::to_string(&cmd).expect("serialize");
        assert!(!json.contains("quality"));
    }
}
