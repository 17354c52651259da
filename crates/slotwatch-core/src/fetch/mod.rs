//! One poll's HTTP GET: a single-attempt transport wrapped in the retry policy.

mod curl_transport;
mod parse;

pub use curl_transport::CurlTransport;

use crate::control::Sleeper;
use crate::retry::{self, RetryPolicy};
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;

/// Status and body of a completed HTTP exchange (any status).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
    /// `Retry-After` in seconds, when the server sent one.
    pub retry_after: Option<Duration>,
    /// `charset` parameter of the final `Content-Type` header.
    pub charset: Option<String>,
}

impl HttpResponse {
    /// Body decoded with the declared charset. Unknown or missing labels decode
    /// as UTF-8; malformed sequences become U+FFFD.
    pub fn text(&self) -> Cow<'_, str> {
        let encoding = self
            .charset
            .as_deref()
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        let (text, _, _) = encoding.decode(&self.body);
        text
    }
}

/// Failure of the network call itself; there is no status to look at.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Transfer cut short because a stop was requested.
    #[error("transfer aborted by stop request")]
    Aborted,
}

/// What a fetch hands to the poll loop once retries are done.
#[derive(Debug)]
pub enum FetchResult {
    Response(HttpResponse),
    NetworkError(FetchError),
    /// A stop request arrived mid-fetch; the poll does not count.
    Interrupted,
}

impl From<Result<HttpResponse, FetchError>> for FetchResult {
    fn from(result: Result<HttpResponse, FetchError>) -> Self {
        match result {
            Ok(response) => FetchResult::Response(response),
            Err(FetchError::Aborted) => FetchResult::Interrupted,
            Err(e) => FetchResult::NetworkError(e),
        }
    }
}

/// Performs exactly one GET, no retries.
pub trait Transport {
    /// `stop` is consulted while the transfer runs so it can be abandoned early.
    fn get(&mut self, url: &str, stop: &dyn Sleeper) -> Result<HttpResponse, FetchError>;
}

/// Something that produces one [`FetchResult`] per poll.
pub trait Fetch {
    fn fetch(&mut self, url: &str) -> FetchResult;
}

impl<F: Fetch + ?Sized> Fetch for &mut F {
    fn fetch(&mut self, url: &str) -> FetchResult {
        (**self).fetch(url)
    }
}

/// Transport plus retry policy. The retry budget starts fresh on every call.
pub struct Fetcher<T, S> {
    transport: T,
    policy: RetryPolicy,
    sleeper: S,
}

impl<T: Transport, S: Sleeper> Fetcher<T, S> {
    pub fn new(transport: T, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            transport,
            policy,
            sleeper,
        }
    }
}

impl<T: Transport, S: Sleeper> Fetch for Fetcher<T, S> {
    fn fetch(&mut self, url: &str) -> FetchResult {
        let transport = &mut self.transport;
        let sleeper = &self.sleeper;
        retry::run_with_retry(&self.policy, sleeper, || transport.get(url, sleeper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Wake;
    use std::collections::VecDeque;

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&self, _duration: Duration) -> Wake {
            Wake::Elapsed
        }

        fn is_stopped(&self) -> bool {
            false
        }
    }

    struct ScriptedTransport {
        statuses: VecDeque<u32>,
        requests: Vec<String>,
    }

    impl Transport for ScriptedTransport {
        fn get(&mut self, url: &str, _stop: &dyn Sleeper) -> Result<HttpResponse, FetchError> {
            self.requests.push(url.to_string());
            let status = self.statuses.pop_front().unwrap_or(200);
            Ok(HttpResponse {
                status,
                body: Vec::new(),
                retry_after: None,
                charset: None,
            })
        }
    }

    #[test]
    fn retry_budget_resets_every_fetch() {
        let transport = ScriptedTransport {
            statuses: VecDeque::from(vec![503, 503, 200, 503, 200]),
            requests: Vec::new(),
        };
        let mut policy = RetryPolicy::default();
        policy.max_retries = 2;
        let mut fetcher = Fetcher::new(transport, policy, NoSleep);

        let first = fetcher.fetch("https://example.test/a");
        assert!(matches!(first, FetchResult::Response(ref r) if r.status == 200));
        let second = fetcher.fetch("https://example.test/a");
        assert!(matches!(second, FetchResult::Response(ref r) if r.status == 200));
        assert_eq!(fetcher.transport.requests.len(), 5);
    }

    #[test]
    fn text_uses_declared_charset() {
        let mut r = HttpResponse {
            status: 200,
            body: b"Gr\xfc\xdfe".to_vec(),
            retry_after: None,
            charset: Some("iso-8859-1".to_string()),
        };
        assert_eq!(r.text(), "Grüße");

        r.charset = Some("no-such-charset".to_string());
        assert_eq!(r.text(), "Gr\u{fffd}\u{fffd}e");

        r.body = "Grüße".as_bytes().to_vec();
        r.charset = None;
        assert_eq!(r.text(), "Grüße");
    }

    #[test]
    fn result_conversion() {
        assert!(matches!(
            FetchResult::from(Err::<HttpResponse, _>(FetchError::Aborted)),
            FetchResult::Interrupted
        ));
        assert!(matches!(
            FetchResult::from(Err::<HttpResponse, _>(FetchError::Curl(
                curl::Error::new(6)
            ))),
            FetchResult::NetworkError(_)
        ));
    }
}
