//! Fire-and-forget user notifications.
//!
//! A missing or broken notification backend is logged and otherwise
//! ignored; it never fails a run.

use notify_rust::Notification;
use tracing::{info, warn};

// ============================================================================
// Notifier
// ============================================================================

/// Delivers a titled message to the user.
pub trait Notifier: Send + Sync {
    /// Delivers the message. Never fails.
    fn notify(&self, title: &str, message: &str);
}

// ============================================================================
// DesktopNotifier
// ============================================================================

/// Desktop notifications through the platform notification service.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        info!(title, message, "Notification");

        if let Err(e) = Notification::new().summary(title).body(message).show() {
            warn!(error = %e, "Desktop notification not delivered");
        }
    }
}
