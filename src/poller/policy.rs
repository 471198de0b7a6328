use std::time::Duration;

use crate::config::PollerConfig;

/// Interval bookkeeping for one webhook poller.
///
/// The interval stays at `base` until failures exceed
/// `max_failures_before_backoff`, then grows by `backoff_factor` per failure
/// up to `max`. One success puts it back to `base`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollingPolicy {
    base_interval: Duration,
    current_interval: Duration,
    consecutive_failures: u32,
    max_failures_before_backoff: u32,
    max_interval: Duration,
    backoff_factor: f64,
}

impl PollingPolicy {
    pub fn new(
        base_interval: Duration,
        max_failures_before_backoff: u32,
        max_interval: Duration,
        backoff_factor: f64,
    ) -> Self {
        Self {
            base_interval,
            current_interval: base_interval,
            consecutive_failures: 0,
            max_failures_before_backoff,
            max_interval: max_interval.max(base_interval),
            backoff_factor,
        }
    }

    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn on_success(&mut self) {
        self.consecutive_failures = 0;
        self.current_interval = self.base_interval;
    }

    pub fn on_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.consecutive_failures <= self.max_failures_before_backoff {
            return;
        }

        let current = self.current_interval.as_millis() as u64;
        let max = self.max_interval.as_millis() as u64;
        let scaled = (current as f64 * self.backoff_factor).round() as u64;
        // Always grow by at least a millisecond until the cap
        let next = scaled.max(current + 1).min(max);
        if next != current {
            tracing::debug!("Backing off polling interval to {}ms", next);
        }
        self.current_interval = Duration::from_millis(next);
    }
}

impl From<&PollerConfig> for PollingPolicy {
    fn from(config: &PollerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_interval_ms),
            config.max_failures_before_backoff,
            Duration::from_millis(config.max_interval_ms),
            config.backoff_factor,
        )
    }
}
