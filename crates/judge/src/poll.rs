//! Polling and retry policies for awaiting a remote job.
//!
//! [`PollPolicy`] controls how often the status endpoint is queried and
//! how long the client is willing to wait. [`RetryPolicy`] controls how
//! many transient status-query failures are absorbed before the wait is
//! abandoned. Both grow their delays with [`next_delay`].

use std::time::Duration;

/// Delay between status queries when nothing else is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Exponential growth parameters for a delay sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    /// Factor by which the delay grows after each step.
    pub multiplier: f64,
    /// Upper bound on the delay.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Calculate the next delay from the current delay and config.
///
/// The result is clamped to [`BackoffConfig::max_delay`].
pub fn next_delay(current: Duration, config: &BackoffConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// How transient status-query failures are retried.
///
/// The default performs no retries: the first failed query ends the
/// wait with a poll error.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failed query.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    pub backoff: BackoffConfig,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_secs(1),
            backoff: BackoffConfig {
                multiplier: 2.0,
                max_delay: Duration::from_secs(8),
            },
        }
    }

    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::none()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Bounds and pacing for awaiting a job's terminal status.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay between consecutive status queries (the initial delay when
    /// `backoff` is set).
    pub interval: Duration,
    /// Give up after this many status queries.
    pub max_attempts: Option<u32>,
    /// Give up once the next query would start later than this after
    /// the first one.
    pub deadline: Option<Duration>,
    /// Grow the interval after each non-terminal status. `None` keeps
    /// it fixed.
    pub backoff: Option<BackoffConfig>,
    pub retry: RetryPolicy,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            deadline: None,
            backoff: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl PollPolicy {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = Some(backoff);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Delay to use after `current`, honouring the optional backoff.
    pub fn next_interval(&self, current: Duration) -> Duration {
        match &self.backoff {
            Some(backoff) => next_delay(current, backoff),
            None => current,
        }
    }
}
