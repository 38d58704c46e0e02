//! DOM element handle.
//!
//! Elements are referenced by id; the content script keeps the actual node.
//! Every operation is generic property or method access:
//!
//! - `click()` → `element.callMethod("click")`
//! - `is_checked()` → `element.getProperty("checked")`
//! - `clear()` → `element.setProperty("value", "")`

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::identifiers::ElementId;
use crate::protocol::{Command, ElementCommand, InputCommand};

use super::Tab;

// ============================================================================
// Element
// ============================================================================

/// A DOM element inside one tab frame.
#[derive(Clone)]
pub struct Element {
    id: ElementId,
    tab: Tab,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("tab_id", &self.tab.tab_id())
            .field("frame_id", &self.tab.frame_id())
            .finish_non_exhaustive()
    }
}

impl Element {
    pub(crate) fn new(id: ElementId, tab: Tab) -> Self {
        Self { id, tab }
    }

    /// Returns the element id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.id
    }
}

// ============================================================================
// Element - Actions
// ============================================================================

impl Element {
    /// Clicks the element.
    pub async fn click(&self) -> Result<()> {
        debug!(element_id = %self.id, "Clicking element");
        self.call_method("click", vec![]).await?;
        Ok(())
    }

    /// Focuses the element.
    pub async fn focus(&self) -> Result<()> {
        self.call_method("focus", vec![]).await?;
        Ok(())
    }

    /// Empties an input's value.
    pub async fn clear(&self) -> Result<()> {
        self.set_property("value", Value::String(String::new())).await
    }

    /// Types text key by key.
    pub async fn type_text(&self, text: &str) -> Result<()> {
        debug!(element_id = %self.id, text_len = text.len(), "Typing text");

        let command = Command::Input(InputCommand::TypeText {
            element_id: self.id.clone(),
            text: text.to_string(),
        });
        self.tab.send_command(command).await?;
        Ok(())
    }

    /// Checks a checkbox. Already-checked boxes are left alone.
    pub async fn check(&self) -> Result<()> {
        if !self.is_checked().await? {
            self.click().await?;
        }
        Ok(())
    }
}

// ============================================================================
// Element - State
// ============================================================================

impl Element {
    /// `true` when the element is rendered (has an `offsetParent`).
    pub async fn is_displayed(&self) -> Result<bool> {
        let offset_parent = self.get_property("offsetParent").await?;
        Ok(!offset_parent.is_null())
    }

    /// Checkbox state.
    pub async fn is_checked(&self) -> Result<bool> {
        let checked = self.get_property("checked").await?;
        Ok(checked.as_bool().unwrap_or(false))
    }
}

// ============================================================================
// Element - Generic Access
// ============================================================================

impl Element {
    /// Reads `element[name]`.
    pub async fn get_property(&self, name: &str) -> Result<Value> {
        let command = Command::Element(ElementCommand::GetProperty {
            element_id: self.id.clone(),
            name: name.to_string(),
        });

        let response = self.tab.send_command(command).await?;
        Ok(response
            .result
            .and_then(|v| v.get("value").cloned())
            .unwrap_or(Value::Null))
    }

    /// Writes `element[name] = value`.
    pub async fn set_property(&self, name: &str, value: Value) -> Result<()> {
        let command = Command::Element(ElementCommand::SetProperty {
            element_id: self.id.clone(),
            name: name.to_string(),
            value,
        });

        self.tab.send_command(command).await?;
        Ok(())
    }

    /// Calls `element[name](...args)`.
    pub async fn call_method(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let command = Command::Element(ElementCommand::CallMethod {
            element_id: self.id.clone(),
            name: name.to_string(),
            args,
        });

        let response = self.tab.send_command(command).await?;
        Ok(response
            .result
            .and_then(|v| v.get("value").cloned())
            .unwrap_or(Value::Null))
    }
}
