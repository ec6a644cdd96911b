//! Elapsed recording time across pause/resume boundaries.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::{Stream, StreamExt, wrappers::IntervalStream};
use tracing::{error, trace};

/// Default display sampling period.
pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct ClockState {
    /// "Zero elapsed", shifted forward by every pause.
    baseline: Option<Instant>,
    paused_at: Option<Instant>,
    accumulated_paused: Duration,
    /// Elapsed value captured at the last freeze or stop.
    frozen: Duration,
    running: bool,
    stopped: bool,
}

impl ClockState {
    fn elapsed(&self, now: Instant) -> Duration {
        match (self.running, self.baseline) {
            (true, Some(baseline)) => now.saturating_duration_since(baseline),
            _ => self.frozen,
        }
    }
}

/// Cumulative recording duration that excludes time spent paused.
///
/// Cloning is cheap and every clone observes the same clock, so a display
/// feed obtained from [`ElapsedClock::sample`] keeps tracking the session
/// while the controller drives it. Reads never mutate the clock.
#[derive(Debug, Clone, Default)]
pub struct ElapsedClock {
    state: Arc<Mutex<ClockState>>,
}

impl ElapsedClock {
    /// Create a clock at zero, not running.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ClockState> {
        // The state is plain data, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|e| {
            error!("Clock lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    /// Start counting from zero.
    pub fn start(&self) {
        let now = Instant::now();
        *self.lock() = ClockState {
            baseline: Some(now),
            running: true,
            ..ClockState::default()
        };
        trace!("Clock started");
    }

    /// Stop counting and hold the current value.
    pub fn freeze(&self) {
        let now = Instant::now();
        let mut state = self.lock();
        if !state.running {
            return;
        }
        state.frozen = state.elapsed(now);
        state.paused_at = Some(now);
        state.running = false;
        trace!(frozen_ms = state.frozen.as_millis(), "Clock frozen");
    }

    /// Continue counting from the frozen value.
    pub fn resume(&self) {
        let now = Instant::now();
        let mut state = self.lock();
        if state.running || state.stopped || state.baseline.is_none() {
            return;
        }
        if let Some(paused_at) = state.paused_at.take() {
            state.accumulated_paused += now.saturating_duration_since(paused_at);
        }
        state.baseline = Some(now.checked_sub(state.frozen).unwrap_or(now));
        state.running = true;
        trace!(frozen_ms = state.frozen.as_millis(), "Clock resumed");
    }

    /// Stop counting for the rest of this recording.
    ///
    /// Further `freeze`/`resume` calls are ignored until the next
    /// [`start`](Self::start) or [`reset`](Self::reset).
    pub fn stop(&self) {
        let now = Instant::now();
        let mut state = self.lock();
        state.frozen = state.elapsed(now);
        state.running = false;
        state.stopped = true;
        trace!(frozen_ms = state.frozen.as_millis(), "Clock stopped");
    }

    /// Return to zero, not running.
    pub fn reset(&self) {
        *self.lock() = ClockState::default();
    }

    /// Whether the clock is currently counting.
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Recorded time so far.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed(Instant::now())
    }

    /// Total time spent between a freeze and the matching resume.
    pub fn paused_duration(&self) -> Duration {
        self.lock().accumulated_paused
    }

    /// Recorded time formatted as `HH:MM:SS`.
    pub fn display(&self) -> String {
        format_elapsed(self.elapsed())
    }

    /// Infinite display feed sampled every `period`.
    ///
    /// The first value is produced immediately. While the clock is frozen or
    /// stopped the feed repeats the frozen value. Each call yields an
    /// independent stream.
    pub fn sample(&self, period: Duration) -> impl Stream<Item = String> + Send + 'static {
        let clock = self.clone();
        let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        IntervalStream::new(interval).map(move |_| clock.display())
    }
}

/// Format a duration as zero-padded `HH:MM:SS`, truncating to whole seconds.
///
/// Hours are not wrapped at 24.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
