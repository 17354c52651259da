//! Classify HTTP statuses and curl errors into retry policy error kinds.

use super::policy::{ErrorKind, RetryPolicy};
use crate::fetch::{FetchError, HttpResponse};

/// Classify a response status. `None` means the response is final and goes
/// back to the caller as-is (200, 404, ...).
pub fn classify_http_status(policy: &RetryPolicy, response: &HttpResponse) -> Option<ErrorKind> {
    policy
        .is_retryable_status(response.status)
        .then_some(ErrorKind::RetryableStatus {
            status: response.status,
            retry_after: response.retry_after,
        })
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify the result of one attempt.
pub fn classify(policy: &RetryPolicy, attempt: &Result<HttpResponse, FetchError>) -> Option<ErrorKind> {
    match attempt {
        Ok(response) => classify_http_status(policy, response),
        Err(FetchError::Curl(e)) => Some(classify_curl_error(e)),
        Err(FetchError::Aborted) => Some(ErrorKind::Other),
    }
}
