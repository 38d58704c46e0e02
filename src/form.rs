//! Registration form driver.
//!
//! Runs the fixed interaction sequence once the classifier has seen the
//! register link. Steps run in order with no retries; the first failing
//! step aborts the attempt. The final submit cannot be undone.

use std::time::Duration;

use tracing::info;

use crate::browser::By;
use crate::classify::register_link;
use crate::config::{Position, RegistrationConfig};
use crate::error::Result;
use crate::notify::Notifier;
use crate::page::{Locator, PageSession};

// ============================================================================
// Constants
// ============================================================================

/// Pause after opening the registration panel.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Waiver checkboxes on the form, `waiver-accept-cb-0` onwards.
pub const WAIVER_COUNT: usize = 3;

/// Success notification.
pub const SUCCESS_NOTICE: (&str, &str) = (
    "Registration Complete",
    "You have successfully registered for Open Play.",
);

const SIGN_IN: &str = "Sign in with LeagueApps";

// ============================================================================
// Controls
// ============================================================================

/// Starts the registration flow after "Register".
#[must_use]
pub fn start_control() -> Locator {
    Locator::frame(By::css("#reg-fa"))
}

/// Sign-in link on the account page.
#[must_use]
pub fn sign_in_link() -> Locator {
    Locator::main(By::link_text(SIGN_IN))
}

/// Email textbox of the sign-in form.
#[must_use]
pub fn email_field() -> Locator {
    Locator::main(By::css("input[type=\"email\"], input[name=\"email\"]"))
}

/// Password textbox of the sign-in form.
#[must_use]
pub fn password_field() -> Locator {
    Locator::main(By::css("input[type=\"password\"]"))
}

/// Submit button of the sign-in form.
#[must_use]
pub fn sign_in_button() -> Locator {
    Locator::main(By::xpath(format!("//button[normalize-space()='{SIGN_IN}']")))
}

/// Eligibility checkbox.
#[must_use]
pub fn eligibility_checkbox() -> Locator {
    Locator::frame(By::css("input[type=\"checkbox\"][value=\"I am eligible\"]"))
}

/// Checkbox for one position.
#[must_use]
pub fn position_checkbox(position: Position) -> Locator {
    Locator::frame(By::css(format!(
        "input[type=\"checkbox\"][value=\"{position}\"]"
    )))
}

/// "Next" button between the player and waiver panels.
#[must_use]
pub fn next_button() -> Locator {
    Locator::frame(By::text("Next"))
}

/// Waiver acceptance checkbox `index`.
#[must_use]
pub fn waiver_checkbox(index: usize) -> Locator {
    Locator::frame(By::css(format!("#waiver-accept-cb-{index}")))
}

/// Electronic signature textbox.
#[must_use]
pub fn signature_field() -> Locator {
    Locator::frame(By::css("#electronicSignature"))
}

/// Final submit button.
#[must_use]
pub fn submit_button() -> Locator {
    Locator::frame(By::css("#register-submit"))
}

// ============================================================================
// Driver
// ============================================================================

/// Fills in and submits the registration form.
///
/// # Errors
///
/// Returns [`Error::ConfigIncomplete`](crate::Error::ConfigIncomplete) before
/// touching the page when a field is missing, otherwise the error of the
/// first step that failed.
pub async fn drive_form(
    page: &mut dyn PageSession,
    config: &RegistrationConfig,
    notifier: &dyn Notifier,
) -> Result<()> {
    config.ensure_complete()?;

    info!(step = 1, "Opening registration");
    page.click(&register_link()).await?;
    page.click(&start_control()).await?;
    page.settle(SETTLE_DELAY).await;

    info!(step = 2, "Signing in");
    page.click(&sign_in_link()).await?;
    page.fill(&email_field(), &config.email).await?;
    page.fill(&password_field(), config.password.expose()).await?;
    page.click(&sign_in_button()).await?;

    info!(step = 3, "Confirming eligibility");
    page.check(&eligibility_checkbox()).await?;

    info!(step = 4, count = config.positions.len(), "Selecting positions");
    for position in &config.positions {
        page.check(&position_checkbox(*position)).await?;
    }

    info!(step = 5, "Continuing to waivers");
    page.click(&next_button()).await?;

    info!(step = 6, count = WAIVER_COUNT, "Accepting waivers");
    for index in 0..WAIVER_COUNT {
        page.check(&waiver_checkbox(index)).await?;
    }

    info!(step = 7, "Signing");
    page.fill(&signature_field(), &config.signature).await?;

    info!(step = 8, "Submitting");
    page.click(&submit_button()).await?;

    info!(step = 9, "Registration submitted");
    let (title, message) = SUCCESS_NOTICE;
    notifier.notify(title, message);
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Secret;
    use crate::error::Error;
    use crate::testing::{Action, Failure, PageLog, RecordingNotifier, ScriptedPage};

    fn config(positions: Vec<Position>) -> RegistrationConfig {
        RegistrationConfig {
            email: "player@example.com".to_string(),
            password: Secret::new("hunter2"),
            signature: "Pat Player".to_string(),
            event_url: "https://example.com/events/42".to_string(),
            positions,
        }
    }

    /// A page with the widget frame already attached.
    async fn attached(page: ScriptedPage) -> ScriptedPage {
        let mut page = page;
        page.attach_frame(&crate::classify::widget_frame(), Duration::from_secs(1))
            .await
            .unwrap();
        page
    }

    #[tokio::test]
    async fn test_full_sequence_in_order() {
        let log = PageLog::default();
        let mut page = attached(ScriptedPage::new(&log)).await;
        let notifier = RecordingNotifier::default();

        drive_form(&mut page, &config(vec![Position::Middle]), &notifier)
            .await
            .unwrap();

        let interactions: Vec<Action> = log
            .actions()
            .into_iter()
            .filter(|a| !matches!(a, Action::AttachFrame(_)))
            .collect();

        assert_eq!(
            interactions,
            vec![
                Action::Click(register_link()),
                Action::Click(start_control()),
                Action::Settle(SETTLE_DELAY),
                Action::Click(sign_in_link()),
                Action::Fill(email_field(), "player@example.com".to_string()),
                Action::Fill(password_field(), "hunter2".to_string()),
                Action::Click(sign_in_button()),
                Action::Check(eligibility_checkbox()),
                Action::Check(position_checkbox(Position::Middle)),
                Action::Click(next_button()),
                Action::Check(waiver_checkbox(0)),
                Action::Check(waiver_checkbox(1)),
                Action::Check(waiver_checkbox(2)),
                Action::Fill(signature_field(), "Pat Player".to_string()),
                Action::Click(submit_button()),
            ]
        );
        assert_eq!(
            notifier.sent(),
            vec![(SUCCESS_NOTICE.0.to_string(), SUCCESS_NOTICE.1.to_string())]
        );
    }

    #[tokio::test]
    async fn test_failed_step_stops_sequence() {
        let log = PageLog::default();
        let page = ScriptedPage::new(&log).fail(next_button(), Failure::Missing);
        let mut page = attached(page).await;
        let notifier = RecordingNotifier::default();

        let err = drive_form(&mut page, &config(vec![Position::Setter]), &notifier)
            .await
            .unwrap_err();

        assert!(err.is_element_error());
        assert!(log.checked().iter().all(|l| !l.by.value().contains("waiver")));
        assert!(!log.clicked().contains(&submit_button()));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_config_touches_nothing() {
        let log = PageLog::default();
        let mut page = attached(ScriptedPage::new(&log)).await;
        let notifier = RecordingNotifier::default();

        let err = drive_form(&mut page, &config(vec![]), &notifier)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ConfigIncomplete { field: "POSITIONS" }));
        assert_eq!(log.actions().len(), 1);
    }

    #[test]
    fn test_position_checkbox_selector() {
        assert_eq!(
            position_checkbox(Position::Opposite).by.value(),
            "input[type=\"checkbox\"][value=\"Opposite\"]"
        );
    }
}
