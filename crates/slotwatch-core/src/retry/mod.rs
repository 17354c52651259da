//! Retry and backoff policy for a single fetch.
//!
//! Classifies each attempt (retryable status, connection failure, timeout)
//! and decides how long to back off, so the fetcher and its tests share one
//! policy. The budget is per fetch: every poll starts from attempt 1.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
