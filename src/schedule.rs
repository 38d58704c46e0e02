//! Weekly scheduling.
//!
//! The [`Scheduler`] is an explicit queue owned by whoever drives it; there
//! is no process-wide singleton. Each [`ScheduledJob`] fires exactly once
//! and moves through a fixed lifecycle:
//!
//! ```text
//! Armed ──due──> Running ──finished──> Done (removed from the queue)
//! ```
//!
//! Whether another job is armed afterwards is decided by the driver loop
//! ([`run_until_idle`]) through a [`RearmPolicy`], never by the job itself.
//!
//! Triggers are local wall-clock times; due times are instants in UTC, so
//! the idle duration stays exact across daylight-saving changes.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{
    DateTime, Datelike, Local, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc, Weekday,
};
use tracing::{debug, info};

use crate::error::{Error, Result};

// ============================================================================
// WeeklyTrigger
// ============================================================================

/// A weekday and local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyTrigger {
    weekday: Weekday,
    time: NaiveTime,
}

impl WeeklyTrigger {
    /// Creates a trigger.
    #[must_use]
    pub fn new(weekday: Weekday, time: NaiveTime) -> Self {
        Self { weekday, time }
    }

    /// Weekday.
    #[inline]
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Time of day.
    #[inline]
    #[must_use]
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// First occurrence strictly after `now`, in `now`'s time zone.
    #[must_use]
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Utc> {
        let tz = now.timezone();
        let local = now.naive_local();
        let days_ahead = (7 + self.weekday.num_days_from_monday()
            - local.weekday().num_days_from_monday())
            % 7;
        let mut date = local.date() + TimeDelta::days(i64::from(days_ahead));

        loop {
            if let Some(due) = resolve_local(&tz, date.and_time(self.time))
                && due > *now
            {
                return due.with_timezone(&Utc);
            }
            date += TimeDelta::weeks(1);
        }
    }
}

/// Maps a wall-clock time to an instant. Ambiguous times take the earlier
/// instant; times skipped by a forward shift move one hour later.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
}

impl fmt::Display for WeeklyTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {} at {}", self.weekday, self.time.format("%H:%M"))
    }
}

// ============================================================================
// Jobs
// ============================================================================

/// Work run by the scheduler.
#[async_trait]
pub trait Job: Send {
    /// Runs the job once. Failures are the job's own business; the
    /// scheduler only records that it ran.
    async fn run(&mut self);
}

/// Identifier of a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Lifecycle of a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Waiting for its due time.
    Armed,
    /// Executing.
    Running,
    /// Finished; no longer in the queue.
    Done,
}

/// A job plus its due time and state.
#[derive(Debug)]
pub struct ScheduledJob<J> {
    id: JobId,
    due: DateTime<Utc>,
    state: JobState,
    job: J,
}

impl<J> ScheduledJob<J> {
    /// Identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Due time.
    #[inline]
    #[must_use]
    pub fn due(&self) -> DateTime<Utc> {
        self.due
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> JobState {
        self.state
    }

    /// The job.
    #[inline]
    #[must_use]
    pub fn job(&self) -> &J {
        &self.job
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Queue of armed single-shot jobs.
#[derive(Debug)]
pub struct Scheduler<J> {
    queue: Vec<ScheduledJob<J>>,
    next_id: u64,
}

impl<J> Default for Scheduler<J> {
    fn default() -> Self {
        Self {
            queue: Vec::new(),
            next_id: 1,
        }
    }
}

impl<J: Job> Scheduler<J> {
    /// Empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `job` for `due`.
    pub fn schedule(&mut self, job: J, due: DateTime<Utc>) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;

        self.queue.push(ScheduledJob {
            id,
            due,
            state: JobState::Armed,
            job,
        });
        self.queue.sort_by_key(|j| (j.due, j.id));

        info!(%id, due = %due.with_timezone(&Local), "Job armed");
        id
    }

    /// `true` when nothing is armed.
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of armed jobs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// The armed jobs, earliest first.
    #[must_use]
    pub fn jobs(&self) -> &[ScheduledJob<J>] {
        &self.queue
    }

    /// Due time of the earliest job.
    #[must_use]
    pub fn next_due_at(&self) -> Option<DateTime<Utc>> {
        self.queue.first().map(|j| j.due)
    }

    /// Time left until the earliest job is due; zero when overdue, `None`
    /// when idle.
    #[must_use]
    pub fn next_due(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.next_due_at()
            .map(|due| (due - now).to_std().unwrap_or(Duration::ZERO))
    }

    /// Runs every job due at `now`, earliest first, each exactly once.
    /// Finished jobs leave the queue and are returned in the `Done` state.
    pub async fn run_pending(&mut self, now: DateTime<Utc>) -> Vec<ScheduledJob<J>> {
        let split = self.queue.partition_point(|j| j.due <= now);
        let due: Vec<ScheduledJob<J>> = self.queue.drain(..split).collect();

        let mut finished = Vec::with_capacity(due.len());
        for mut entry in due {
            entry.state = JobState::Running;
            info!(id = %entry.id, "Job running");

            entry.job.run().await;

            entry.state = JobState::Done;
            info!(id = %entry.id, "Job done");
            finished.push(entry);
        }
        finished
    }
}

// ============================================================================
// Re-arm Policy
// ============================================================================

/// What the driver loop does after a job has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RearmPolicy {
    /// Arm nothing; the loop ends once the queue is empty.
    #[default]
    Once,
    /// Arm a fresh job for the next weekly trigger.
    Weekly,
}

impl FromStr for RearmPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(Self::Once),
            "weekly" => Ok(Self::Weekly),
            other => Err(Error::config(format!(
                "Unknown re-arm policy: {other} (expected once or weekly)"
            ))),
        }
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Wall clock and sleeping, for the driver loop.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Zone the weekly trigger is read in.
    type Tz: TimeZone;

    /// Current time in [`Self::Tz`].
    fn now(&self) -> DateTime<Self::Tz>;

    /// Sleeps for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Local time and tokio's timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Driver Loop
// ============================================================================

/// Sleeps until the next job is due, runs it, re-arms per `rearm`, and
/// returns once the queue is empty.
///
/// `make_job` is only called when `rearm` is [`RearmPolicy::Weekly`].
pub async fn run_until_idle<J, C, F>(
    scheduler: &mut Scheduler<J>,
    clock: &C,
    trigger: WeeklyTrigger,
    rearm: RearmPolicy,
    mut make_job: F,
) where
    J: Job,
    C: Clock,
    F: FnMut() -> J,
{
    loop {
        let Some(wait) = scheduler.next_due(clock.now().to_utc()) else {
            info!("No jobs armed; scheduler idle");
            break;
        };

        if !wait.is_zero() {
            info!(
                wait_secs = wait.as_secs(),
                due = ?scheduler.next_due_at(),
                "Waiting for next job"
            );
            clock.sleep(wait).await;
        }

        let finished = scheduler.run_pending(clock.now().to_utc()).await;
        if finished.is_empty() {
            debug!("Woke before due time");
            continue;
        }

        if rearm == RearmPolicy::Weekly {
            let due = trigger.next_after(&clock.now());
            scheduler.schedule(make_job(), due);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
