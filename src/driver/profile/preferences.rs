//! `user.js` preference lines: `user_pref("name", value);`.

// ============================================================================
// PreferenceValue
// ============================================================================

/// A preference value as Firefox understands it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValue {
    /// Boolean preference.
    Bool(bool),
    /// Integer preference.
    Int(i32),
    /// String preference.
    String(String),
}

impl PreferenceValue {
    /// Renders the value as a JavaScript literal.
    #[must_use]
    pub fn to_js_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::String(s) => format!("\"{}\"", escape_js_string(s)),
        }
    }
}

impl From<bool> for PreferenceValue {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for PreferenceValue {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for PreferenceValue {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

// ============================================================================
// FirefoxPreference
// ============================================================================

/// One `user_pref` entry.
#[derive(Debug, Clone)]
pub struct FirefoxPreference {
    /// Preference name.
    pub key: &'static str,
    /// Preference value.
    pub value: PreferenceValue,
}

impl FirefoxPreference {
    /// Creates a preference.
    #[inline]
    #[must_use]
    pub fn new(key: &'static str, value: impl Into<PreferenceValue>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    /// Formats as a `user.js` line without trailing newline.
    #[must_use]
    pub fn to_user_pref_line(&self) -> String {
        format!("user_pref(\"{}\", {});", self.key, self.value.to_js_string())
    }
}

fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_pref_line_formats() {
        assert_eq!(
            FirefoxPreference::new("xpinstall.signatures.required", false).to_user_pref_line(),
            "user_pref(\"xpinstall.signatures.required\", false);"
        );
        assert_eq!(
            FirefoxPreference::new("browser.startup.page", 0).to_user_pref_line(),
            "user_pref(\"browser.startup.page\", 0);"
        );
    }

    #[test]
    fn test_string_values_are_escaped() {
        let value = PreferenceValue::from("say \"hi\"\n");
        assert_eq!(value.to_js_string(), "\"say \\\"hi\\\"\\n\"");
    }
}
