use std::time::Duration;

/// When and how long to wait before reopening a dropped stream.
///
/// Delays grow linearly by `initial_delay` until they reach `linear_limit`,
/// then double on every attempt up to `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Reconnections allowed in a row. Zero means the stream is never reopened.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub linear_limit: Duration,
    pub max_delay: Duration,
}

impl ReconnectPolicy {
    pub fn disabled() -> Self {
        Self::with_attempts(0)
    }

    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_secs(1),
            linear_limit: Duration::from_secs(60),
            max_delay: Duration::from_secs(16 * 60),
        }
    }

    /// Delay before reconnection number `attempt` (1-based), or `None` once
    /// the attempts are used up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let mut delay = self.initial_delay;
        for _ in 1..attempt {
            if delay < self.linear_limit {
                delay += self.initial_delay;
            } else {
                delay = delay.saturating_mul(2);
            }
            if delay >= self.max_delay {
                return Some(self.max_delay);
            }
        }
        Some(delay.min(self.max_delay))
    }
}
