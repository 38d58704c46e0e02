//! Firefox command-line options.

// ============================================================================
// Constants
// ============================================================================

/// Viewport used for registration runs.
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (1280, 800);

// ============================================================================
// FirefoxOptions
// ============================================================================

/// Process flags for a launched window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirefoxOptions {
    /// Run without a visible window.
    pub headless: bool,

    /// Initial window size as `(width, height)`.
    pub window_size: Option<(u32, u32)>,
}

impl Default for FirefoxOptions {
    fn default() -> Self {
        Self {
            headless: false,
            window_size: Some(DEFAULT_WINDOW_SIZE),
        }
    }
}

impl FirefoxOptions {
    /// Default options: visible window at 1280x800.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets headless mode.
    #[inline]
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Sets the window size.
    #[inline]
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    /// Converts to Firefox arguments.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(3);

        if self.headless {
            args.push("--headless".to_string());
        }

        if let Some((width, height)) = self.window_size {
            args.push("--window-size".to_string());
            args.push(format!("{width},{height}"));
        }

        args
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_registration_viewport() {
        let args = FirefoxOptions::new().to_args();
        assert_eq!(args, vec!["--window-size", "1280,800"]);
    }

    #[test]
    fn test_headless_flag_comes_first() {
        let args = FirefoxOptions::new()
            .with_headless(true)
            .with_window_size(800, 600)
            .to_args();
        assert_eq!(args, vec!["--headless", "--window-size", "800,600"]);
    }
}
