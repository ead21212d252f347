//! Step timing.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Measures one step: wall-clock start plus monotonic elapsed time.
#[derive(Debug, Clone, Copy)]
pub struct StepTimer {
    started_at: DateTime<Utc>,
    start: Instant,
}

impl StepTimer {
    /// Starts a new timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            start: Instant::now(),
        }
    }

    /// Returns when the timer was started.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the time elapsed since start.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}
