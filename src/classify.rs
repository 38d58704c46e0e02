//! Page state classification.
//!
//! The event page embeds the registration widget in an iframe. Its DOM
//! signals overlap (a sold-out page can also show a disabled button), so
//! they are checked in a fixed priority order and the first match wins:
//!
//! | Order | Signal | State |
//! |-------|--------|-------|
//! | 1 | document status not 200/202 | [`PageState::PageLoadFailed`] |
//! | 2 | embedded frame never appears | [`PageState::PageLoadFailed`] |
//! | 3 | "Register" link visible | [`PageState::RegistrationOpen`] |
//! | 4 | disabled large button visible | [`PageState::AtCapacity`] |
//! | 5 | "Pay Now" or "Sold Out" visible | [`PageState::AlreadyRegisteredOrSoldOut`] |
//! | 6 | none of the above | [`PageState::RegisterLinkMissing`] |
//!
//! Every state other than `RegistrationOpen` leaves a screenshot behind.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::browser::By;
use crate::page::{Locator, PageSession, capture_diagnostic};

// ============================================================================
// Controls
// ============================================================================

/// Document statuses treated as a successful load.
pub const ACCEPTED_STATUS: [u16; 2] = [200, 202];

/// The iframe hosting the registration widget.
#[must_use]
pub fn widget_frame() -> By {
    By::css("iframe#monolith-iframe")
}

/// "Register" link inside the widget.
#[must_use]
pub fn register_link() -> Locator {
    Locator::frame(By::link_text("Register"))
}

/// Disabled large button shown when the session is full.
#[must_use]
pub fn capacity_button() -> Locator {
    Locator::frame(By::css("a.btn.large-btn.disabled"))
}

/// "Pay Now" button shown to players who already registered.
#[must_use]
pub fn pay_now_button() -> Locator {
    Locator::frame(By::xpath(
        "//a[contains(concat(' ', normalize-space(@class), ' '), ' btn ') \
         and contains(concat(' ', normalize-space(@class), ' '), ' right ') \
         and contains(., 'Pay Now')]",
    ))
}

/// "Sold Out" site notice.
#[must_use]
pub fn sold_out_notice() -> Locator {
    Locator::frame(By::xpath(
        "//em[contains(concat(' ', normalize-space(@class), ' '), ' site-notice ') \
         and contains(., 'Sold Out')]",
    ))
}

// ============================================================================
// PageState
// ============================================================================

/// What the event page currently allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// The register link is visible.
    RegistrationOpen,
    /// The session is full.
    AtCapacity,
    /// Already registered, or sold out.
    AlreadyRegisteredOrSoldOut,
    /// The page loaded but no known signal matched.
    RegisterLinkMissing,
    /// Bad document status, or the widget frame never appeared.
    PageLoadFailed,
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RegistrationOpen => "registration open",
            Self::AtCapacity => "at capacity",
            Self::AlreadyRegisteredOrSoldOut => "already registered or sold out",
            Self::RegisterLinkMissing => "register link missing",
            Self::PageLoadFailed => "page load failed",
        };
        f.write_str(name)
    }
}

/// A classifier verdict plus the screenshot taken for it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The verdict.
    pub state: PageState,
    /// Diagnostic screenshot; `None` for open registration or when the
    /// capture failed.
    pub screenshot: Option<PathBuf>,
}

// ============================================================================
// Classifier
// ============================================================================

/// Classifies the loaded page.
///
/// Never fails: an absent control is a branch, a frame that never appears
/// is [`PageState::PageLoadFailed`].
pub async fn classify(
    page: &mut dyn PageSession,
    frame_timeout: Duration,
    screenshot_path: &Path,
) -> Classification {
    match page.response_status() {
        Some(status) if !ACCEPTED_STATUS.contains(&status) => {
            error!(status, "Event page did not load");
            return verdict(page, PageState::PageLoadFailed, screenshot_path).await;
        }
        Some(status) => debug!(status, "Event page loaded"),
        None => warn!("No document status observed; continuing"),
    }

    if let Err(e) = page.attach_frame(&widget_frame(), frame_timeout).await {
        error!(error = %e, "Registration widget frame not found");
        return verdict(page, PageState::PageLoadFailed, screenshot_path).await;
    }

    let state = if page.is_visible(&register_link()).await {
        PageState::RegistrationOpen
    } else if page.is_visible(&capacity_button()).await {
        PageState::AtCapacity
    } else if page.is_visible(&pay_now_button()).await
        || page.is_visible(&sold_out_notice()).await
    {
        PageState::AlreadyRegisteredOrSoldOut
    } else {
        PageState::RegisterLinkMissing
    };

    verdict(page, state, screenshot_path).await
}

async fn verdict(
    page: &mut dyn PageSession,
    state: PageState,
    screenshot_path: &Path,
) -> Classification {
    info!(%state, "Page classified");

    let screenshot = match state {
        PageState::RegistrationOpen => None,
        _ => capture_diagnostic(page, screenshot_path).await,
    };
    Classification { state, screenshot }
}

// ============================================================================
// Tests
// ============================================================================
