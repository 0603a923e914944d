//! Start/stop wall clock for one execution strategy.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Start instant plus a write-once end instant.
#[derive(Debug)]
pub struct JobTimer {
    start: Instant,
    end: OnceLock<Instant>,
}

impl JobTimer {
    /// Starts the clock now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            end: OnceLock::new(),
        }
    }

    /// Stamps the end instant. Returns false if it was already stamped.
    pub fn stop(&self) -> bool {
        self.end.set(Instant::now()).is_ok()
    }

    /// Final duration once stopped, time elapsed so far otherwise.
    pub fn elapsed(&self) -> Duration {
        match self.end.get() {
            Some(end) => end.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }
}
