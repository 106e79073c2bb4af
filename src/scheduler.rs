//! Cron-driven invocation of job callbacks.
//!
//! Expressions use a leading seconds column
//! (`sec min hour day-of-month month [day-of-week [year]]`), crontab
//! day-of-week numbering, shorthands such as `@hourly`, and fixed intervals
//! written `@every 5m`. Each registered job gets a ticker thread; every tick
//! runs the callback on a fresh thread so a slow run never delays the next.

use std::{
    fmt,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use chrono::{DateTime, Local, Timelike};
use cron::Schedule;
use log::{debug, error, info};
use thiserror::Error;

use crate::duration::parse_duration;

/// Work run on every tick.
pub type JobCallback = Arc<dyn Fn() + Send + Sync>;

/// Upper bound on a single sleep so [`CronScheduler::stop`] takes effect
/// promptly.
const MAX_TICK_SLEEP: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid schedule {expression:?}: {reason}")]
    Invalid { expression: String, reason: String },
    #[error("scheduler already started")]
    AlreadyStarted,
    #[error("unable to spawn scheduler thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Shortest `@every` interval; shorter ones are raised to it.
const MIN_EVERY: Duration = Duration::from_secs(1);

/// When a job fires.
#[derive(Clone, Debug)]
pub enum JobSchedule {
    /// Calendar expression evaluated by the `cron` crate.
    Cron(Box<Schedule>),
    /// `@every <duration>`: fixed interval in whole seconds.
    Every(Duration),
}

impl JobSchedule {
    /// First fire time strictly after `after`, or `None` once the schedule
    /// is exhausted.
    pub fn next_after(&self, after: DateTime<Local>) -> Option<DateTime<Local>> {
        match self {
            Self::Cron(schedule) => schedule.after(&after).next(),
            Self::Every(interval) => {
                let whole_second = after.with_nanosecond(0).unwrap_or(after);
                let step = chrono::Duration::from_std(*interval).ok()?;
                whole_second.checked_add_signed(step)
            }
        }
    }
}

impl FromStr for JobSchedule {
    type Err = ScheduleError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        parse_schedule(expression)
    }
}

/// Parse a schedule expression.
///
/// Accepts `@every <duration>`, the `cron` crate's shorthands such as
/// `@hourly`, and five, six or seven field expressions with a leading seconds
/// column. A missing sixth field means any day of the week. Day-of-week
/// numbers use the classic crontab numbering (0 or 7 = Sunday, 1 = Monday)
/// and are renumbered for the `cron` crate.
pub fn parse_schedule(expression: &str) -> Result<JobSchedule, ScheduleError> {
    let invalid = |reason: String| ScheduleError::Invalid {
        expression: expression.to_owned(),
        reason,
    };
    let trimmed = expression.trim();
    if let Some(interval) = trimmed.strip_prefix("@every") {
        let interval = parse_duration(interval).map_err(|err| invalid(err.to_string()))?;
        let whole = Duration::from_secs(interval.as_secs()).max(MIN_EVERY);
        return Ok(JobSchedule::Every(whole));
    }
    if trimmed.starts_with('@') {
        return Schedule::from_str(trimmed)
            .map(|schedule| JobSchedule::Cron(Box::new(schedule)))
            .map_err(|err| invalid(err.to_string()));
    }

    let mut fields: Vec<String> = trimmed.split_whitespace().map(str::to_owned).collect();
    if fields.len() == 5 {
        fields.push("*".to_owned());
    }
    if let Some(day_of_week) = fields.get_mut(5) {
        *day_of_week = renumber_days_of_week(day_of_week);
    }
    Schedule::from_str(&fields.join(" "))
        .map(|schedule| JobSchedule::Cron(Box::new(schedule)))
        .map_err(|err| invalid(err.to_string()))
}

/// Map a crontab day-of-week field (0-7, Sunday = 0 or 7) onto the `cron`
/// crate's numbering (1-7, Sunday = 1). Names and wildcards pass through;
/// items that do not parse are left for the `cron` crate to reject.
fn renumber_days_of_week(field: &str) -> String {
    field
        .split(',')
        .map(|item| renumber_day_item(item).unwrap_or_else(|| item.to_owned()))
        .collect::<Vec<_>>()
        .join(",")
}

fn renumber_day_item(item: &str) -> Option<String> {
    if item == "*" || item == "?" {
        return None;
    }
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, Some(step.parse::<usize>().ok().filter(|s| *s > 0)?)),
        None => (item, None),
    };
    let (low, high) = match range.split_once('-') {
        Some((low, high)) => (low.parse::<u8>().ok()?, high.parse::<u8>().ok()?),
        None if range == "*" => (0, 6),
        None => {
            let day = range.parse::<u8>().ok()?;
            (day, if step.is_some() { 6 } else { day })
        }
    };
    if low > high || high > 7 {
        return None;
    }
    let mut days: Vec<u8> = (low..=high)
        .step_by(step.unwrap_or(1))
        .map(|day| day % 7 + 1)
        .collect();
    days.sort_unstable();
    days.dedup();
    Some(
        days.iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Registers callbacks against schedules and fires them.
pub trait Scheduler {
    fn register(&mut self, schedule: &str, callback: JobCallback) -> Result<(), ScheduleError>;

    /// Begin firing registered callbacks. Returns immediately.
    fn start(&mut self) -> Result<(), ScheduleError>;
}

struct Entry {
    expression: String,
    schedule: JobSchedule,
    callback: JobCallback,
}

/// [`Scheduler`] backed by the `cron` crate and one thread per job.
#[derive(Default)]
pub struct CronScheduler {
    entries: Vec<Entry>,
    tickers: Vec<JoinHandle<()>>,
    stopped: Arc<AtomicBool>,
    started: bool,
}

impl CronScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ask every ticker to exit. Runs already in progress are not interrupted.
    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        for ticker in self.tickers.drain(..) {
            if ticker.join().is_err() {
                error!("scheduler ticker panicked");
            }
        }
    }
}

impl fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expressions: Vec<&str> = self.entries.iter().map(|e| e.expression.as_str()).collect();
        f.debug_struct("CronScheduler")
            .field("schedules", &expressions)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl Scheduler for CronScheduler {
    fn register(&mut self, schedule: &str, callback: JobCallback) -> Result<(), ScheduleError> {
        if self.started {
            return Err(ScheduleError::AlreadyStarted);
        }
        self.entries.push(Entry {
            expression: schedule.to_owned(),
            schedule: parse_schedule(schedule)?,
            callback,
        });
        Ok(())
    }

    fn start(&mut self) -> Result<(), ScheduleError> {
        if self.started {
            return Err(ScheduleError::AlreadyStarted);
        }
        self.started = true;
        for (index, entry) in self.entries.iter().enumerate() {
            let schedule = entry.schedule.clone();
            let callback = Arc::clone(&entry.callback);
            let stopped = Arc::clone(&self.stopped);
            let expression = entry.expression.clone();
            let ticker = thread::Builder::new()
                .name(format!("cron-ticker-{index}"))
                .spawn(move || tick(&expression, &schedule, &callback, &stopped))?;
            self.tickers.push(ticker);
        }
        info!("scheduler started with {} jobs", self.entries.len());
        Ok(())
    }
}

fn tick(expression: &str, schedule: &JobSchedule, callback: &JobCallback, stopped: &AtomicBool) {
    let mut cursor = Local::now();
    while !stopped.load(Ordering::Acquire) {
        let Some(next) = schedule.next_after(cursor) else {
            info!("schedule {expression:?} has no further fire times");
            return;
        };
        if !sleep_until(next, stopped) {
            return;
        }
        let run = Arc::clone(callback);
        if let Err(err) = thread::Builder::new()
            .name("cron-job".into())
            .spawn(move || (*run)())
        {
            error!("schedule {expression:?}: unable to start run: {err}");
        }
        // Runs missed while the host was suspended are skipped, not replayed.
        cursor = next.max(Local::now());
        debug!("schedule {expression:?} fired for {next}");
    }
}

/// Sleep until `deadline`; `false` if stopped first.
fn sleep_until(deadline: DateTime<Local>, stopped: &AtomicBool) -> bool {
    loop {
        if stopped.load(Ordering::Acquire) {
            return false;
        }
        let Ok(remaining) = (deadline - Local::now()).to_std() else {
            return true;
        };
        if remaining.is_zero() {
            return true;
        }
        thread::sleep(remaining.min(MAX_TICK_SLEEP));
    }
}
