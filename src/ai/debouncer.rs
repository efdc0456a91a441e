//! Debounce timer for suggestion requests
//!
//! Collapses bursts of content changes into a single fetch: each change
//! restarts the timer, and only a quiet period of the configured length
//! lets a fetch through.

use std::time::{Duration, Instant};

/// Tracks when the last content change occurred and whether a fetch is
/// waiting for the quiet period to elapse.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    last_change: Option<Instant>,
    pending: bool,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last_change: None,
            pending: false,
        }
    }

    /// Record a content change. Restarts the timer; rapid successive calls
    /// collapse into one pending fetch.
    pub fn schedule(&mut self) {
        self.last_change = Some(Instant::now());
        self.pending = true;
    }

    /// Drop the pending fetch and reset the timer.
    pub fn cancel(&mut self) {
        self.pending = false;
        self.last_change = None;
    }

    /// True once a fetch is pending and the quiet period has elapsed since
    /// the last recorded change.
    pub fn is_ready(&self) -> bool {
        if !self.pending {
            return false;
        }
        match self.last_change {
            Some(last) => last.elapsed() >= self.delay,
            None => false,
        }
    }

    /// Clear the pending state after the fetch has been initiated.
    pub fn mark_fired(&mut self) {
        self.pending = false;
        self.last_change = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(1000)
    }
}
