//! Time based repeat detection

use std::time::{Duration, Instant};

/// Classification of one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// First event after a quiet period
    Fresh,
    /// Arrived within the window; carries the consecutive repeat count
    Repeated(u32),
}

impl Repeat {
    /// Check if the event is a repeat
    pub fn is_repeat(&self) -> bool {
        matches!(self, Repeat::Repeated(_))
    }
}

/// Repeat state for one producer or one dispatcher
///
/// A zero window disables detection: every event is [`Repeat::Fresh`].
#[derive(Debug, Clone)]
pub struct RepeatDetector {
    window: Duration,
    last: Instant,
    count: u32,
}

impl RepeatDetector {
    /// Create a detector with the given window
    pub fn new(window: Duration) -> Self {
        Self::starting_at(window, Instant::now())
    }

    /// Create a detector whose previous event happened at `last`
    pub fn starting_at(window: Duration, last: Instant) -> Self {
        Self {
            window,
            last,
            count: 0,
        }
    }

    /// Create a detector that never reports repeats
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Classify an event arriving at `now`
    pub fn classify(&mut self, now: Instant) -> Repeat {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;

        if elapsed < self.window {
            self.count = self.count.saturating_add(1);
            Repeat::Repeated(self.count)
        } else {
            self.count = 0;
            Repeat::Fresh
        }
    }

    /// Current consecutive repeat count
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Configured window
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RepeatDetector {
    fn default() -> Self {
        Self::disabled()
    }
}
