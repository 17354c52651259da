//! Integration test: the curl fetcher against a local scripted server.

mod common;

use common::scripted_server::{refused_url, Canned, ScriptedServer};
use slotwatch_core::config::{HttpConfig, RetryConfig};
use slotwatch_core::control::StopSignal;
use slotwatch_core::fetch::{CurlTransport, Fetch, FetchResult, Fetcher};
use slotwatch_core::retry::RetryPolicy;
use std::time::{Duration, Instant};

fn quick_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::from(&RetryConfig {
        max_retries,
        backoff_factor_secs: 0.0,
        ..RetryConfig::default()
    })
}

fn fetcher(policy: RetryPolicy, stop: StopSignal) -> Fetcher<CurlTransport, StopSignal> {
    let http = HttpConfig {
        user_agent: "slotwatch-test/1.0".to_string(),
        connect_timeout_secs: 5,
        timeout_secs: 10,
    };
    Fetcher::new(CurlTransport::new(&http).unwrap(), policy, stop)
}

#[test]
fn retries_server_errors_then_returns_page() {
    let server = ScriptedServer::start(vec![
        Canned::status(503, "Service Unavailable"),
        Canned::status(502, "Bad Gateway"),
        Canned::ok("<p>Termine</p>"),
    ]);
    let mut f = fetcher(quick_policy(5), StopSignal::new());
    match f.fetch(&server.url) {
        FetchResult::Response(r) => {
            assert_eq!(r.status, 200);
            assert_eq!(r.body, b"<p>Termine</p>");
        }
        other => panic!("expected response, got {:?}", other),
    }
    assert_eq!(server.requests(), 3);
}

#[test]
fn gives_up_after_budget_and_returns_last_status() {
    let server = ScriptedServer::start(vec![Canned::status(504, "Gateway Timeout")]);
    let mut f = fetcher(quick_policy(2), StopSignal::new());
    match f.fetch(&server.url) {
        FetchResult::Response(r) => assert_eq!(r.status, 504),
        other => panic!("expected response, got {:?}", other),
    }
    assert_eq!(server.requests(), 3);
}

#[test]
fn non_retryable_status_is_returned_at_once() {
    let server = ScriptedServer::start(vec![Canned::status(403, "Forbidden")]);
    let mut f = fetcher(quick_policy(5), StopSignal::new());
    assert!(matches!(
        f.fetch(&server.url),
        FetchResult::Response(ref r) if r.status == 403
    ));
    assert_eq!(server.requests(), 1);
}

#[test]
fn sends_client_identifier() {
    let server = ScriptedServer::start(vec![Canned::ok("page")]);
    let mut f = fetcher(quick_policy(0), StopSignal::new());
    let _ = f.fetch(&server.url);
    assert_eq!(server.user_agents(), vec!["slotwatch-test/1.0".to_string()]);
}

#[test]
fn retry_after_header_is_reported() {
    let server = ScriptedServer::start(vec![
        Canned::status(503, "Service Unavailable").header("Retry-After", "0"),
        Canned::status(429, "Too Many Requests").header("Retry-After", "30"),
    ]);
    let mut f = fetcher(quick_policy(1), StopSignal::new());
    match f.fetch(&server.url) {
        FetchResult::Response(r) => {
            assert_eq!(r.status, 429);
            assert_eq!(r.retry_after, Some(Duration::from_secs(30)));
        }
        other => panic!("expected response, got {:?}", other),
    }
}

#[test]
fn latin1_page_is_decoded_with_declared_charset() {
    let server = ScriptedServer::start(vec![Canned::bytes(b"<p>keine Termine f\xfcr Sie</p>")
        .header("Content-Type", "text/html; charset=ISO-8859-1")]);
    let mut f = fetcher(quick_policy(0), StopSignal::new());
    match f.fetch(&server.url) {
        FetchResult::Response(r) => {
            assert_eq!(r.charset.as_deref(), Some("ISO-8859-1"));
            assert_eq!(r.text(), "<p>keine Termine für Sie</p>");
        }
        other => panic!("expected response, got {:?}", other),
    }
}

#[test]
fn refused_connection_is_network_error() {
    let mut f = fetcher(quick_policy(1), StopSignal::new());
    assert!(matches!(
        f.fetch(&refused_url()),
        FetchResult::NetworkError(_)
    ));
}

#[test]
fn stop_aborts_pending_backoff() {
    let server = ScriptedServer::start(vec![Canned::status(503, "Service Unavailable")]);
    let policy = RetryPolicy::from(&RetryConfig {
        max_retries: 5,
        backoff_factor_secs: 30.0,
        ..RetryConfig::default()
    });
    let stop = StopSignal::new();
    let mut f = fetcher(policy, stop.clone());
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(300));
        stop.stop();
    });
    let started = Instant::now();
    assert!(matches!(f.fetch(&server.url), FetchResult::Interrupted));
    assert!(started.elapsed() < Duration::from_secs(20));
    stopper.join().unwrap();
}
