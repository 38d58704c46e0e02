//! Element locator strategies.
//!
//! ```ignore
//! By::css("#reg-fa");
//! By::link_text("Register");
//! By::text("Next");
//! By::xpath("//button[normalize-space()='Sign in with LeagueApps']");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// By
// ============================================================================

/// How the content script should look an element up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum By {
    /// CSS selector.
    Css(String),
    /// XPath expression.
    XPath(String),
    /// Element whose trimmed text equals the value exactly.
    Text(String),
    /// Anchor whose visible text equals the value.
    LinkText(String),
}

impl By {
    /// CSS selector.
    #[inline]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// XPath expression.
    #[inline]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Exact text match.
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Link by visible text.
    #[inline]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Strategy name understood by the extension.
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::Text(_) => "text",
            Self::LinkText(_) => "linkText",
        }
    }

    /// Locator value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Css(v) | Self::XPath(v) | Self::Text(v) | Self::LinkText(v) => v,
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy(), self.value())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategies() {
        assert_eq!(By::css("#reg-fa").strategy(), "css");
        assert_eq!(By::xpath("//a").strategy(), "xpath");
        assert_eq!(By::text("Next").strategy(), "text");
        assert_eq!(By::link_text("Register").strategy(), "linkText");
    }

    #[test]
    fn test_display_includes_strategy() {
        assert_eq!(By::link_text("Register").to_string(), "linkText:Register");
        assert_eq!(By::css("#electronicSignature").value(), "#electronicSignature");
    }
}
