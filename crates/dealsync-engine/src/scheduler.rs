//! Periodic reconciliation sweeps.
//!
//! Each scheduler instance owns its own timer task, reentrancy flag and last-sweep
//! bookkeeping. The timer task only fires ticks; every sweep runs in its own task,
//! so stopping the timer never cuts a sweep short.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::engine::{SweepReport, SyncEngine, SyncError};

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerStatus {
    /// A sweep is in progress right now.
    pub is_running: bool,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub last_sync_duration_ms: Option<u64>,
    pub last_sync_count: Option<usize>,
    pub sync_interval_minutes: f64,
    /// The periodic timer is armed.
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Completed(SweepReport),
    /// Another sweep held the reentrancy guard.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, Copy)]
struct LastSweep {
    at: DateTime<Utc>,
    duration_ms: u64,
    count: usize,
}

struct Inner {
    engine: Arc<SyncEngine>,
    period: Mutex<Duration>,
    timer: Mutex<Option<JoinHandle<()>>>,
    is_running: AtomicBool,
    last: Mutex<Option<LastSweep>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.timer).take() {
            handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the reentrancy flag however the sweep ends, panics included.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct ReconciliationScheduler {
    inner: Arc<Inner>,
}

impl ReconciliationScheduler {
    /// A zero `period` falls back to [`DEFAULT_SYNC_INTERVAL`].
    pub fn new(engine: Arc<SyncEngine>, period: Duration) -> Self {
        let period = if period.is_zero() {
            DEFAULT_SYNC_INTERVAL
        } else {
            period
        };
        Self {
            inner: Arc::new(Inner {
                engine,
                period: Mutex::new(period),
                timer: Mutex::new(None),
                is_running: AtomicBool::new(false),
                last: Mutex::new(None),
            }),
        }
    }

    pub fn period(&self) -> Duration {
        *lock(&self.inner.period)
    }

    pub fn is_active(&self) -> bool {
        lock(&self.inner.timer).is_some()
    }

    /// Arms the timer and sweeps immediately. Returns `false` if already started.
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut timer = lock(&self.inner.timer);
        if timer.is_some() {
            debug!("reconciliation scheduler already active");
            return false;
        }

        let period = self.period();
        let weak = Arc::downgrade(&self.inner);
        *timer = Some(tokio::spawn(tick_loop(weak, period)));
        info!(
            interval_minutes = period.as_secs_f64() / 60.0,
            "reconciliation scheduler started"
        );
        true
    }

    /// Disarms the timer. A sweep already in flight runs to completion.
    pub fn stop(&self) -> bool {
        match lock(&self.inner.timer).take() {
            Some(handle) => {
                handle.abort();
                info!("reconciliation scheduler stopped");
                true
            }
            None => false,
        }
    }

    /// Changes the period; an active scheduler is restarted, which sweeps once
    /// immediately.
    pub fn update_interval(&self, period: Duration) -> Result<(), SyncError> {
        if period.is_zero() {
            return Err(SyncError::InvalidInterval);
        }
        *lock(&self.inner.period) = period;
        if self.stop() {
            self.start();
        }
        Ok(())
    }

    /// One guarded sweep. Skips without touching the ledgers if a sweep is already
    /// running; failures are logged and never escape.
    pub async fn run_sync(&self) -> TickOutcome {
        let inner = &self.inner;
        if inner
            .is_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("previous sweep still running, skipping tick");
            return TickOutcome::Skipped;
        }
        let _guard = RunningGuard(&inner.is_running);

        match inner.engine.sync_all_deals().await {
            Ok(report) => {
                *lock(&inner.last) = Some(LastSweep {
                    at: Utc::now(),
                    duration_ms: report.duration_ms,
                    count: report.synced(),
                });
                TickOutcome::Completed(report)
            }
            Err(err) => {
                error!(error = %err, "scheduled sweep failed");
                TickOutcome::Failed(err.to_string())
            }
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        let last = *lock(&self.inner.last);
        SchedulerStatus {
            is_running: self.inner.is_running.load(Ordering::Acquire),
            last_sync_time: last.map(|l| l.at),
            last_sync_duration_ms: last.map(|l| l.duration_ms),
            last_sync_count: last.map(|l| l.count),
            sync_interval_minutes: self.period().as_secs_f64() / 60.0,
            is_active: self.is_active(),
        }
    }
}

async fn tick_loop(inner: Weak<Inner>, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            debug!("scheduler dropped, ending timer");
            return;
        };
        let scheduler = ReconciliationScheduler { inner };
        tokio::spawn(async move {
            scheduler.run_sync().await;
        });
    }
}
