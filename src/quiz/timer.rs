use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::utils::time::whole_seconds_between;

/// Source of wall-clock time for the session timer.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used to replay attempts at fixed instants.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn at_millis(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis.load(Ordering::SeqCst))
            .single()
            .unwrap_or_default()
    }

    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct TimerState {
    started_at_millis: Option<i64>,
    elapsed_seconds: u64,
    completion_seconds: Option<u64>,
    ticking: bool,
}

/// Measures the time from quiz start to submission.
///
/// While running, a recurring tick refreshes the elapsed view. `stop` and
/// `reset` clear the `ticking` flag under the state lock before aborting the
/// tick task, so no tick can write after either returns.
pub struct SessionTimer {
    clock: Arc<dyn Clock>,
    period: Duration,
    state: Arc<Mutex<TimerState>>,
    ticker: Option<JoinHandle<()>>,
}

impl SessionTimer {
    pub fn new(clock: Arc<dyn Clock>, period: Duration) -> Self {
        Self {
            clock,
            period,
            state: Arc::new(Mutex::new(TimerState::default())),
            ticker: None,
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock), Duration::from_secs(1))
    }

    /// A timer sharing this one's clock and tick period, in its unset state.
    pub fn fresh(&self) -> Self {
        Self::new(self.clock.clone(), self.period)
    }

    /// Starts measuring from now. Restarting a running timer moves the start
    /// instant and replaces the tick rather than adding a second one.
    pub fn start(&mut self) {
        self.cancel_tick();
        let started_at = self.clock.now_millis();
        {
            let mut state = self.lock_state();
            state.started_at_millis = Some(started_at);
            state.elapsed_seconds = 0;
            state.completion_seconds = None;
            state.ticking = true;
        }
        self.spawn_tick(started_at);
    }

    /// Fixes and returns the completion time. Returns 0 if never started;
    /// once fixed, repeated calls return the same value.
    pub fn stop(&mut self) -> u64 {
        self.cancel_tick();
        let now = self.clock.now_millis();
        let mut state = self.lock_state();
        if let Some(fixed) = state.completion_seconds {
            return fixed;
        }
        match state.started_at_millis {
            Some(started_at) => {
                let seconds = whole_seconds_between(started_at, now);
                state.completion_seconds = Some(seconds);
                state.elapsed_seconds = state.elapsed_seconds.max(seconds);
                seconds
            }
            None => 0,
        }
    }

    pub fn reset(&mut self) {
        self.cancel_tick();
        *self.lock_state() = TimerState::default();
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.lock_state().elapsed_seconds
    }

    pub fn completion_seconds(&self) -> Option<u64> {
        self.lock_state().completion_seconds
    }

    pub fn started_at_millis(&self) -> Option<i64> {
        self.lock_state().started_at_millis
    }

    pub fn is_running(&self) -> bool {
        self.lock_state().ticking
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, TimerState> {
        self.state.lock().expect("timer state mutex poisoned")
    }

    fn cancel_tick(&mut self) {
        self.lock_state().ticking = false;
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }

    fn spawn_tick(&mut self, started_at: i64) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No async runtime available; session timer runs without a live tick");
            return;
        };

        let state = Arc::clone(&self.state);
        let clock = Arc::clone(&self.clock);
        let period = self.period;

        self.ticker = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let now = clock.now_millis();
                let mut state = state.lock().expect("timer state mutex poisoned");
                if !state.ticking || state.started_at_millis != Some(started_at) {
                    break;
                }
                let seconds = whole_seconds_between(started_at, now);
                state.elapsed_seconds = state.elapsed_seconds.max(seconds);
            }
        }));
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for SessionTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("SessionTimer")
            .field("period", &self.period)
            .field("started_at_millis", &state.started_at_millis)
            .field("elapsed_seconds", &state.elapsed_seconds)
            .field("completion_seconds", &state.completion_seconds)
            .field("ticking", &state.ticking)
            .finish()
    }
}
