//! Run orchestration: one registration attempt from browser launch to
//! notification, and the scheduled job that wraps it.
//!
//! Nothing that happens on the page escapes as an error. Timeouts,
//! missing controls and unrecognised pages all become a [`RunOutcome`]
//! with a screenshot; only a browser that cannot be launched at all is
//! returned as [`Error::SessionUnavailable`](crate::Error::SessionUnavailable).

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use crate::classify::{PageState, classify};
use crate::config::{ConfigStore, Prompter, RegistrationConfig, clear_event_url, merge_and_save};
use crate::error::{Error, Result};
use crate::form::drive_form;
use crate::notify::Notifier;
use crate::page::{PageSession, SessionLauncher, capture_diagnostic, open_session};
use crate::schedule::Job;

// ============================================================================
// RunStatus / RunOutcome
// ============================================================================

/// How an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// The form was submitted.
    Success,
    /// The session is full.
    AtCapacity,
    /// Already registered, or sold out.
    AlreadyDone,
    /// The register link was missing for an unrecognised reason.
    ClassificationFailure,
    /// The event page or its widget did not load.
    LoadFailure,
    /// A bounded wait expired during navigation or the form drive.
    TimedOut,
    /// A form step failed for a reason other than a timeout.
    SubmissionFailed,
}

impl RunStatus {
    /// Notification for this outcome. `Success` is announced by the form
    /// driver itself.
    #[must_use]
    pub fn notice(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Success => None,
            Self::AtCapacity => Some(("Registration Status", "Open Play is at capacity.")),
            Self::AlreadyDone => Some((
                "Registration Status",
                "You are already registered or sold out.",
            )),
            Self::ClassificationFailure => Some((
                "Registration Error",
                "Open Play registration link not found.",
            )),
            Self::LoadFailure => Some((
                "Registration Error",
                "The Open Play event page did not load.",
            )),
            Self::TimedOut => Some((
                "Registration Error",
                "Open Play registration timed out.",
            )),
            Self::SubmissionFailed => Some((
                "Registration Error",
                "Open Play registration could not be submitted.",
            )),
        }
    }
}

impl From<PageState> for RunStatus {
    /// Status for a page that was not open for registration.
    fn from(state: PageState) -> Self {
        match state {
            PageState::RegistrationOpen => Self::Success,
            PageState::AtCapacity => Self::AtCapacity,
            PageState::AlreadyRegisteredOrSoldOut => Self::AlreadyDone,
            PageState::RegisterLinkMissing => Self::ClassificationFailure,
            PageState::PageLoadFailed => Self::LoadFailure,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// How it ended.
    pub status: RunStatus,
    /// Screenshot left for inspection.
    pub diagnostic: Option<PathBuf>,
}

impl RunOutcome {
    fn new(status: RunStatus, diagnostic: Option<PathBuf>) -> Self {
        Self { status, diagnostic }
    }
}

// ============================================================================
// RunSettings
// ============================================================================

/// Bounds and paths for an attempt.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Bound on the widget frame wait.
    pub frame_timeout: Duration,
    /// Where diagnostic screenshots go; overwritten each time.
    pub screenshot_path: PathBuf,
}

impl RunSettings {
    /// Settings with the screenshot under `<data_dir>/debug_screenshot/`.
    #[must_use]
    pub fn new(data_dir: &Path, frame_timeout: Duration) -> Self {
        Self {
            frame_timeout,
            screenshot_path: diagnostic_path(data_dir),
        }
    }
}

/// Fixed diagnostic screenshot path.
#[must_use]
pub fn diagnostic_path(data_dir: &Path) -> PathBuf {
    data_dir.join("debug_screenshot").join("error_screenshot.png")
}

// ============================================================================
// run_once
// ============================================================================

/// Runs one registration attempt.
///
/// The session is closed on every path, and every outcome other than
/// success is notified exactly once.
///
/// # Errors
///
/// Only [`Error::SessionUnavailable`] when the browser cannot be launched.
pub async fn run_once(
    config: &RegistrationConfig,
    launcher: &dyn SessionLauncher,
    notifier: &dyn Notifier,
    settings: &RunSettings,
) -> Result<RunOutcome> {
    let mut page = open_session(launcher).await?;

    let outcome = attempt(page.as_mut(), config, notifier, settings).await;
    page.close().await;

    info!(
        status = %outcome.status,
        diagnostic = ?outcome.diagnostic,
        "Registration attempt finished"
    );
    if let Some((title, message)) = outcome.status.notice() {
        notifier.notify(title, message);
    }
    Ok(outcome)
}

async fn attempt(
    page: &mut dyn PageSession,
    config: &RegistrationConfig,
    notifier: &dyn Notifier,
    settings: &RunSettings,
) -> RunOutcome {
    info!(url = %config.event_url, "Opening event page");
    if let Err(e) = page.goto(&config.event_url).await {
        let status = if e.is_timeout() {
            RunStatus::TimedOut
        } else {
            RunStatus::LoadFailure
        };
        return failed(page, status, &e, settings).await;
    }

    let classification = classify(page, settings.frame_timeout, &settings.screenshot_path).await;
    if classification.state != PageState::RegistrationOpen {
        return RunOutcome::new(classification.state.into(), classification.screenshot);
    }

    match drive_form(page, config, notifier).await {
        Ok(()) => RunOutcome::new(RunStatus::Success, None),
        Err(e) => {
            let status = if e.is_timeout() {
                RunStatus::TimedOut
            } else {
                RunStatus::SubmissionFailed
            };
            failed(page, status, &e, settings).await
        }
    }
}

async fn failed(
    page: &mut dyn PageSession,
    status: RunStatus,
    cause: &Error,
    settings: &RunSettings,
) -> RunOutcome {
    error!(%status, error = %cause, "Registration attempt failed");
    let diagnostic = capture_diagnostic(page, &settings.screenshot_path).await;
    RunOutcome::new(status, diagnostic)
}

// ============================================================================
// RegistrationJob
// ============================================================================

/// The weekly job: merge config, run one attempt, clear the event URL.
pub struct RegistrationJob {
    store: ConfigStore,
    launcher: Arc<dyn SessionLauncher>,
    notifier: Arc<dyn Notifier>,
    prompter: Box<dyn Prompter>,
    settings: RunSettings,
    last_outcome: Option<RunOutcome>,
}

impl fmt::Debug for RegistrationJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationJob")
            .field("store", &self.store)
            .field("settings", &self.settings)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}

impl RegistrationJob {
    /// Creates the job.
    #[must_use]
    pub fn new(
        store: ConfigStore,
        launcher: Arc<dyn SessionLauncher>,
        notifier: Arc<dyn Notifier>,
        prompter: Box<dyn Prompter>,
        settings: RunSettings,
    ) -> Self {
        Self {
            store,
            launcher,
            notifier,
            prompter,
            settings,
            last_outcome: None,
        }
    }

    /// Outcome of the run, once it has happened and reached the page.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&RunOutcome> {
        self.last_outcome.as_ref()
    }

    async fn attempt(&mut self) -> Result<RunOutcome> {
        let config = merge_and_save(&self.store, self.prompter.as_mut())?;
        run_once(
            &config,
            self.launcher.as_ref(),
            self.notifier.as_ref(),
            &self.settings,
        )
        .await
    }
}

#[async_trait]
impl Job for RegistrationJob {
    async fn run(&mut self) {
        match self.attempt().await {
            Ok(outcome) => self.last_outcome = Some(outcome),
            Err(e) => error!(error = %e, "Registration attempt aborted"),
        }

        if let Err(e) = clear_event_url(&self.store) {
            error!(error = %e, "Failed to clear event URL");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
