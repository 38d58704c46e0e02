//! In-memory fakes for the page, launcher, notifier and prompter.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::browser::By;
use crate::config::Prompter;
use crate::error::{Error, Result};
use crate::identifiers::{FrameId, TabId};
use crate::notify::Notifier;
use crate::page::{Locator, PageSession, Scope, SessionLauncher};

// ============================================================================
// ScriptedPage
// ============================================================================

/// One call made against a [`ScriptedPage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Goto(String),
    AttachFrame(By),
    WaitFor(Locator),
    IsVisible(Locator),
    Click(Locator),
    Fill(Locator, String),
    Check(Locator),
    Screenshot(PathBuf),
    Settle(Duration),
    Close,
}

/// How a scripted action fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    /// Bounded wait expired.
    Timeout,
    /// Control could not be found.
    Missing,
}

impl Failure {
    fn error(self, locator: &Locator) -> Error {
        match self {
            Self::Timeout => Error::timeout(format!("wait_for({})", locator.by), 30_000),
            Self::Missing => {
                Error::element_not_found(locator.by.to_string(), TabId::INITIAL, FrameId::main())
            }
        }
    }
}

/// Shared record of everything a page was asked to do. Outlives the
/// session it was handed to.
#[derive(Debug, Clone, Default)]
pub(crate) struct PageLog(Arc<Mutex<Vec<Action>>>);

impl PageLog {
    fn push(&self, action: Action) {
        self.0.lock().push(action);
    }

    pub(crate) fn actions(&self) -> Vec<Action> {
        self.0.lock().clone()
    }

    pub(crate) fn checked(&self) -> Vec<Locator> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Check(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn clicked(&self) -> Vec<Locator> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Click(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn screenshots(&self) -> usize {
        self.count(|a| matches!(a, Action::Screenshot(_)))
    }

    pub(crate) fn frame_waits(&self) -> usize {
        self.count(|a| matches!(a, Action::AttachFrame(_)))
    }

    pub(crate) fn closed(&self) -> bool {
        self.count(|a| *a == Action::Close) == 1
    }

    pub(crate) fn count(&self, pred: impl Fn(&Action) -> bool) -> usize {
        self.0.lock().iter().filter(|a| pred(a)).count()
    }
}

/// A page whose status, frame and visible controls are fixed up front.
#[derive(Debug)]
pub(crate) struct ScriptedPage {
    status: Option<u16>,
    frame: bool,
    frame_attached: bool,
    visible: Vec<Locator>,
    failures: Vec<(Locator, Failure)>,
    goto_failure: Option<Failure>,
    log: PageLog,
}

impl ScriptedPage {
    /// A `200` page with the embedded frame and nothing visible.
    pub(crate) fn new(log: &PageLog) -> Self {
        Self {
            status: Some(200),
            frame: true,
            frame_attached: false,
            visible: Vec::new(),
            failures: Vec::new(),
            goto_failure: None,
            log: log.clone(),
        }
    }

    pub(crate) fn status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn without_frame(mut self) -> Self {
        self.frame = false;
        self
    }

    pub(crate) fn visible(mut self, locator: Locator) -> Self {
        self.visible.push(locator);
        self
    }

    pub(crate) fn fail(mut self, locator: Locator, failure: Failure) -> Self {
        self.failures.push((locator, failure));
        self
    }

    pub(crate) fn fail_goto(mut self, failure: Failure) -> Self {
        self.goto_failure = Some(failure);
        self
    }

    fn act(&self, action: Action, locator: &Locator) -> Result<()> {
        self.log.push(action);

        if locator.scope == Scope::Frame && !self.frame_attached {
            return Err(Error::FrameNotAttached);
        }
        match self.failures.iter().find(|(l, _)| l == locator) {
            Some((_, failure)) => Err(failure.error(locator)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PageSession for ScriptedPage {
    async fn goto(&mut self, url: &str) -> Result<Option<u16>> {
        self.log.push(Action::Goto(url.to_string()));
        self.frame_attached = false;
        match self.goto_failure {
            Some(failure) => Err(failure.error(&Locator::main(By::css("html")))),
            None => Ok(self.status),
        }
    }

    fn response_status(&self) -> Option<u16> {
        self.status
    }

    async fn attach_frame(&mut self, frame: &By, wait: Duration) -> Result<()> {
        self.log.push(Action::AttachFrame(frame.clone()));
        if !self.frame {
            let ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
            return Err(Error::timeout(format!("wait_for({frame})"), ms));
        }
        self.frame_attached = true;
        Ok(())
    }

    async fn wait_for(&mut self, locator: &Locator, _wait: Duration) -> Result<()> {
        self.act(Action::WaitFor(locator.clone()), locator)
    }

    async fn is_visible(&mut self, locator: &Locator) -> bool {
        self.log.push(Action::IsVisible(locator.clone()));
        (locator.scope == Scope::Main || self.frame_attached) && self.visible.contains(locator)
    }

    async fn click(&mut self, locator: &Locator) -> Result<()> {
        self.act(Action::Click(locator.clone()), locator)
    }

    async fn fill(&mut self, locator: &Locator, text: &str) -> Result<()> {
        self.act(Action::Fill(locator.clone(), text.to_string()), locator)
    }

    async fn check(&mut self, locator: &Locator) -> Result<()> {
        self.act(Action::Check(locator.clone()), locator)
    }

    async fn screenshot(&mut self, path: &Path) -> Result<()> {
        self.log.push(Action::Screenshot(path.to_path_buf()));
        Ok(())
    }

    async fn settle(&mut self, delay: Duration) {
        self.log.push(Action::Settle(delay));
    }

    async fn close(self: Box<Self>) {
        self.log.push(Action::Close);
    }
}

// ============================================================================
// FakeLauncher
// ============================================================================

/// Hands out prepared pages in order; fails once they run out.
#[derive(Debug, Default)]
pub(crate) struct FakeLauncher {
    pages: Mutex<VecDeque<ScriptedPage>>,
    opened: Mutex<usize>,
}

impl FakeLauncher {
    pub(crate) fn with(page: ScriptedPage) -> Self {
        Self {
            pages: Mutex::new(VecDeque::from([page])),
            opened: Mutex::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self::default()
    }

    pub(crate) fn opened(&self) -> usize {
        *self.opened.lock()
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn open(&self) -> Result<Box<dyn PageSession>> {
        let page = self
            .pages
            .lock()
            .pop_front()
            .ok_or_else(|| Error::firefox_not_found("/missing/firefox"))?;
        *self.opened.lock() += 1;
        Ok(Box::new(page))
    }
}

// ============================================================================
// RecordingNotifier
// ============================================================================

/// Keeps every notification.
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.sent.lock().push((title.to_string(), message.to_string()));
    }
}

// ============================================================================
// ScriptedPrompter
// ============================================================================

#[derive(Debug)]
enum Answer {
    Text(String),
    Secret(String),
    Select(Vec<String>),
}

/// Answers prompts from a fixed script, in order.
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn then_text(mut self, answer: &str) -> Self {
        self.answers.push_back(Answer::Text(answer.to_string()));
        self
    }

    pub(crate) fn then_secret(mut self, answer: &str) -> Self {
        self.answers.push_back(Answer::Secret(answer.to_string()));
        self
    }

    pub(crate) fn then_select(mut self, answer: &[&str]) -> Self {
        self.answers
            .push_back(Answer::Select(answer.iter().map(|s| (*s).to_string()).collect()));
        self
    }

    /// Messages asked so far.
    pub(crate) fn asked(&self) -> Vec<String> {
        self.asked.clone()
    }

    fn next(&mut self, message: &str) -> Result<Answer> {
        self.asked.push(message.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| Error::prompt(format!("no scripted answer for: {message}")))
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&mut self, message: &str) -> Result<String> {
        match self.next(message)? {
            Answer::Text(answer) => Ok(answer),
            other => Err(Error::prompt(format!("expected text, scripted {other:?}"))),
        }
    }

    fn secret(&mut self, message: &str) -> Result<String> {
        match self.next(message)? {
            Answer::Secret(answer) => Ok(answer),
            other => Err(Error::prompt(format!("expected secret, scripted {other:?}"))),
        }
    }

    fn multi_select(&mut self, message: &str, _choices: &[&str]) -> Result<Vec<String>> {
        match self.next(message)? {
            Answer::Select(answer) => Ok(answer),
            other => Err(Error::prompt(format!("expected selection, scripted {other:?}"))),
        }
    }
}
