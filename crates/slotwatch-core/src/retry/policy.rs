use crate::config::RetryConfig;
use std::time::Duration;

/// Classification of a failed attempt for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection refused/reset, DNS, etc.).
    Connection,
    /// Status listed in the forcelist, with the server's `Retry-After` if any.
    RetryableStatus {
        status: u32,
        retry_after: Option<Duration>,
    },
    /// Any other error (not retried).
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry; hand the last result back.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff: no delay before the first retry, then
/// `factor * 2^(n-2)` before retry `n`, capped at `max_backoff`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    pub backoff_factor: Duration,
    pub max_backoff: Duration,
    pub status_forcelist: Vec<u32>,
    pub respect_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            backoff_factor: Duration::try_from_secs_f64(cfg.backoff_factor_secs)
                .unwrap_or(Duration::ZERO),
            max_backoff: Duration::from_secs(cfg.max_backoff_secs),
            status_forcelist: cfg.status_forcelist.clone(),
            respect_retry_after: cfg.respect_retry_after,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries; each fetch is a single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn is_retryable_status(&self, status: u32) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Backoff before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let exp = 1u32 << (retry - 2).min(16);
        self.backoff_factor.saturating_mul(exp).min(self.max_backoff)
    }

    /// Decide what to do after `attempt` (1-based) failed with `kind`.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt > self.max_retries {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::RetryableStatus {
                retry_after: Some(wait),
                ..
            } if self.respect_retry_after => RetryDecision::RetryAfter(wait.min(self.max_backoff)),
            ErrorKind::Timeout | ErrorKind::Connection | ErrorKind::RetryableStatus { .. } => {
                RetryDecision::RetryAfter(self.backoff(attempt))
            }
        }
    }
}
