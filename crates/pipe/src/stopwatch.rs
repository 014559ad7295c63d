//! Scope guard adding elapsed wall-clock time to an accumulator

use std::time::{Duration, Instant};

/// Adds the time between `start` and drop to `total`.
///
/// Dropping runs on every exit path of the enclosing scope, including `?`.
pub(crate) struct Stopwatch<'a> {
    total: &'a mut Duration,
    started: Instant,
}

impl<'a> Stopwatch<'a> {
    pub(crate) fn start(total: &'a mut Duration) -> Self {
        Self {
            total,
            started: Instant::now(),
        }
    }
}

impl Drop for Stopwatch<'_> {
    fn drop(&mut self) {
        *self.total = self.total.saturating_add(self.started.elapsed());
    }
}
