// Classification throttling - limits how often tensors are sent to the classifier

use std::time::{Duration, Instant};

pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(2000);

/// Tracks the last accepted prediction and gates new requests on it.
///
/// Only confident results move the window; rejected attempts are dropped, not queued.
#[derive(Debug, Clone)]
pub struct ClassificationThrottler {
    interval: Duration,
    last_accepted_at: Option<Instant>,
}

impl Default for ClassificationThrottler {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_INTERVAL)
    }
}

impl ClassificationThrottler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted_at: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_accepted_at(&self) -> Option<Instant> {
        self.last_accepted_at
    }

    /// Allowed iff no prediction has been accepted yet or `interval` has elapsed
    pub fn is_allowed(&self, now: Instant) -> bool {
        match self.last_accepted_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Record a confident prediction obtained from an attempt made at `at`
    pub fn record_accepted(&mut self, at: Instant) {
        self.last_accepted_at = Some(at);
    }

    /// Back to "never accepted", as at session start
    pub fn reset(&mut self) {
        self.last_accepted_at = None;
    }
}
