//! Page capability used by the classifier and the form driver.
//!
//! [`PageSession`] is the small surface the registration logic needs from a
//! browser: navigate, attach to the embedded widget frame, wait for, read,
//! click, fill and check controls, and capture the viewport. Nothing above
//! this module touches [`Tab`] or [`Window`] directly.
//!
//! Visibility is a question, not a failure: [`PageSession::is_visible`]
//! answers `false` when a control is absent. Actions that need a control
//! wait for it and fail with [`Error::Timeout`] when it never shows up.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::browser::{By, Element, Tab, Window};
use crate::driver::{Driver, FirefoxOptions};
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default bound for waits on individual controls.
pub const DEFAULT_ELEMENT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Locator
// ============================================================================

/// Which document a locator is resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The top-level page.
    Main,
    /// The attached embedded frame.
    Frame,
}

/// A control on the page: a document scope plus a lookup strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    /// Document the control lives in.
    pub scope: Scope,
    /// Lookup strategy within that document.
    pub by: By,
}

impl Locator {
    /// Control in the top-level page.
    #[inline]
    #[must_use]
    pub fn main(by: By) -> Self {
        Self {
            scope: Scope::Main,
            by,
        }
    }

    /// Control inside the embedded frame.
    #[inline]
    #[must_use]
    pub fn frame(by: By) -> Self {
        Self {
            scope: Scope::Frame,
            by,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Scope::Main => write!(f, "main/{}", self.by),
            Scope::Frame => write!(f, "frame/{}", self.by),
        }
    }
}

// ============================================================================
// PageSession
// ============================================================================

/// One open browser page.
#[async_trait]
pub trait PageSession: Send {
    /// Navigates the top-level page and returns the document status, if one
    /// was observed.
    async fn goto(&mut self, url: &str) -> Result<Option<u16>>;

    /// Status of the last top-level document response.
    fn response_status(&self) -> Option<u16>;

    /// Waits for the iframe matching `frame` and scopes
    /// [`Scope::Frame`] locators to its document.
    async fn attach_frame(&mut self, frame: &By, wait: Duration) -> Result<()>;

    /// Waits until the control is present.
    async fn wait_for(&mut self, locator: &Locator, wait: Duration) -> Result<()>;

    /// `true` when the control exists and is rendered. Never fails.
    async fn is_visible(&mut self, locator: &Locator) -> bool;

    /// Clicks the control.
    async fn click(&mut self, locator: &Locator) -> Result<()>;

    /// Replaces the control's text with `text`.
    async fn fill(&mut self, locator: &Locator, text: &str) -> Result<()>;

    /// Checks a checkbox. Already-checked boxes stay checked.
    async fn check(&mut self, locator: &Locator) -> Result<()>;

    /// Writes a PNG of the viewport to `path`, overwriting.
    async fn screenshot(&mut self, path: &Path) -> Result<()>;

    /// Pauses for a UI transition to finish rendering.
    async fn settle(&mut self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }

    /// Releases the page and everything behind it.
    async fn close(self: Box<Self>);
}

/// Opens page sessions.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Opens a fresh session.
    ///
    /// # Errors
    ///
    /// Any error here means no session exists and nothing needs closing.
    async fn open(&self) -> Result<Box<dyn PageSession>>;
}

// ============================================================================
// Firefox Adapter
// ============================================================================

/// Launches one Firefox window per session.
#[derive(Debug)]
pub struct FirefoxLauncher {
    driver: Driver,
    options: FirefoxOptions,
    element_timeout: Duration,
}

impl FirefoxLauncher {
    /// Creates a launcher.
    #[must_use]
    pub fn new(driver: Driver, options: FirefoxOptions) -> Self {
        Self {
            driver,
            options,
            element_timeout: DEFAULT_ELEMENT_TIMEOUT,
        }
    }

    /// Sets the bound used when an action waits for its control.
    #[must_use]
    pub fn with_element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }
}

#[async_trait]
impl SessionLauncher for FirefoxLauncher {
    async fn open(&self) -> Result<Box<dyn PageSession>> {
        let window = self.driver.launch(&self.options).await?;
        let main = window.tab();
        debug!(session_id = %window.session_id(), "Page session opened");

        Ok(Box::new(FirefoxSession {
            window,
            main,
            frame: None,
            element_timeout: self.element_timeout,
        }))
    }
}

/// [`PageSession`] over a Firefox [`Window`].
struct FirefoxSession {
    window: Window,
    main: Tab,
    frame: Option<Tab>,
    element_timeout: Duration,
}

impl FirefoxSession {
    fn tab(&self, scope: Scope) -> Result<&Tab> {
        match scope {
            Scope::Main => Ok(&self.main),
            Scope::Frame => self.frame.as_ref().ok_or(Error::FrameNotAttached),
        }
    }

    /// Waits for the control within the element timeout.
    async fn resolve(&self, locator: &Locator) -> Result<Element> {
        self.tab(locator.scope)?
            .wait_for_element(&locator.by, self.element_timeout)
            .await
    }
}

#[async_trait]
impl PageSession for FirefoxSession {
    async fn goto(&mut self, url: &str) -> Result<Option<u16>> {
        self.frame = None;
        self.main.goto(url).await
    }

    fn response_status(&self) -> Option<u16> {
        self.main.document_status()
    }

    async fn attach_frame(&mut self, frame: &By, wait: Duration) -> Result<()> {
        let iframe = self.main.wait_for_element(frame, wait).await?;
        let tab = self.main.switch_to_frame(&iframe).await?;
        debug!(frame_id = %tab.frame_id(), "Embedded frame attached");
        self.frame = Some(tab);
        Ok(())
    }

    async fn wait_for(&mut self, locator: &Locator, wait: Duration) -> Result<()> {
        self.tab(locator.scope)?
            .wait_for_element(&locator.by, wait)
            .await?;
        Ok(())
    }

    async fn is_visible(&mut self, locator: &Locator) -> bool {
        let Ok(tab) = self.tab(locator.scope) else {
            return false;
        };
        let Ok(element) = tab.find_element(&locator.by).await else {
            return false;
        };
        element.is_displayed().await.unwrap_or(false)
    }

    async fn click(&mut self, locator: &Locator) -> Result<()> {
        debug!(%locator, "Click");
        self.resolve(locator).await?.click().await
    }

    async fn fill(&mut self, locator: &Locator, text: &str) -> Result<()> {
        debug!(%locator, text_len = text.len(), "Fill");
        let element = self.resolve(locator).await?;
        element.focus().await?;
        element.clear().await?;
        element.type_text(text).await
    }

    async fn check(&mut self, locator: &Locator) -> Result<()> {
        debug!(%locator, "Check");
        self.resolve(locator).await?.check().await
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        self.main.save_png(path).await
    }

    async fn close(self: Box<Self>) {
        let session_id = self.window.session_id();
        self.window.close().await;
        debug!(%session_id, "Page session closed");
    }
}

/// Captures the viewport for later inspection. A failed capture is
/// logged and yields `None`.
pub async fn capture_diagnostic(page: &mut dyn PageSession, path: &Path) -> Option<PathBuf> {
    match page.screenshot(path).await {
        Ok(()) => {
            info!(path = %path.display(), "Diagnostic screenshot saved");
            Some(path.to_path_buf())
        }
        Err(e) => {
            warn!(error = %e, "Diagnostic screenshot failed");
            None
        }
    }
}

/// Opens a session, logging and wrapping any failure as
/// [`Error::SessionUnavailable`].
pub async fn open_session(launcher: &dyn SessionLauncher) -> Result<Box<dyn PageSession>> {
    launcher.open().await.map_err(|e| {
        warn!(error = %e, "Browser session unavailable");
        Error::session_unavailable(e)
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_scope() {
        let register = Locator::frame(By::link_text("Register"));
        assert_eq!(register.scope, Scope::Frame);
        assert_eq!(Locator::main(By::css("#x")).scope, Scope::Main);
    }

    #[test]
    fn test_locator_display() {
        let next = Locator::frame(By::text("Next"));
        assert_eq!(next.to_string(), "frame/text:Next");
    }

    #[tokio::test]
    async fn test_open_session_wraps_launch_failure() {
        struct Broken;

        #[async_trait]
        impl SessionLauncher for Broken {
            async fn open(&self) -> Result<Box<dyn PageSession>> {
                Err(Error::firefox_not_found("/nope/firefox"))
            }
        }

        let err = open_session(&Broken).await.err().expect("launch must fail");
        assert!(matches!(err, Error::SessionUnavailable { .. }));
        assert!(err.to_string().contains("/nope/firefox"));
    }
}
