//! Retry loop: run one attempt at a time until the result is final or the
//! policy gives up.

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::control::{Sleeper, Wake};
use crate::fetch::{FetchError, FetchResult, HttpResponse};

/// Runs `attempt` until it yields a final result or the retry budget is spent,
/// sleeping through `sleeper` between attempts. Returns the last observed
/// result; a stop request during a backoff or a transfer yields `Interrupted`.
pub fn run_with_retry<S, F>(policy: &RetryPolicy, sleeper: &S, mut attempt: F) -> FetchResult
where
    S: Sleeper + ?Sized,
    F: FnMut() -> Result<HttpResponse, FetchError>,
{
    let mut n = 1u32;
    loop {
        if sleeper.is_stopped() {
            return FetchResult::Interrupted;
        }
        let result = attempt();
        if matches!(result, Err(FetchError::Aborted)) {
            return FetchResult::Interrupted;
        }
        let kind = match classify::classify(policy, &result) {
            Some(kind) => kind,
            None => return result.into(),
        };
        match policy.decide(n, kind) {
            RetryDecision::NoRetry => return result.into(),
            RetryDecision::RetryAfter(delay) => {
                tracing::debug!(attempt = n, ?kind, ?delay, "retrying fetch");
                if sleeper.sleep(delay) == Wake::Stopped {
                    return FetchResult::Interrupted;
                }
                n += 1;
            }
        }
    }
}
