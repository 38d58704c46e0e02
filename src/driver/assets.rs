//! Init page Firefox opens on startup.
//!
//! The page posts a `WEBDRIVER_INIT` message carrying the WebSocket URL. The
//! extension's content script picks it up and the background script dials
//! back to the local server.

// ============================================================================
// Imports
// ============================================================================

use serde_json::json;

use crate::identifiers::SessionId;

// ============================================================================
// Public Functions
// ============================================================================

/// Builds the `data:text/html,...` URI passed as Firefox's start page.
#[must_use]
pub fn build_init_data_uri(ws_url: &str, session_id: SessionId) -> String {
    let config = json!({
        "type": "WEBDRIVER_INIT",
        "wsUrl": ws_url,
        "sessionId": session_id.as_u32(),
    });

    let html = INIT_HTML_TEMPLATE
        .replace("$SESSION_ID", &session_id.to_string())
        .replace("$CONFIG_JSON", &config.to_string());

    format!("data:text/html,{}", urlencoding::encode(&html))
}

// ============================================================================
// Constants
// ============================================================================

const INIT_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Open Play Signup</title>
</head>
<body style="font-family: monospace; padding: 40px;">
    <p>Connecting session $SESSION_ID...</p>
    <script>window.postMessage($CONFIG_JSON, '*');</script>
</body>
</html>"#;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_is_encoded_html() {
        let uri = build_init_data_uri("ws://127.0.0.1:4444", SessionId::next());

        assert!(uri.starts_with("data:text/html,"));
        assert!(!uri.contains('<'));
        assert!(!uri.contains('>'));
    }

    #[test]
    fn test_data_uri_carries_init_message() {
        let session_id = SessionId::next();
        let uri = build_init_data_uri("ws://127.0.0.1:4444", session_id);
        let html = urlencoding::decode(uri.trim_start_matches("data:text/html,"))
            .expect("decode")
            .into_owned();

        assert!(html.contains("\"type\":\"WEBDRIVER_INIT\""));
        assert!(html.contains("\"wsUrl\":\"ws://127.0.0.1:4444\""));
        assert!(html.contains(&format!("\"sessionId\":{session_id}")));
    }
}
