//! Minimal HTTP/1.1 server for integration tests that answers GETs from a
//! script of canned responses, one per connection.
//!
//! Once the script runs out the last response repeats. Every request's
//! `User-Agent` is recorded so tests can check what the client sent.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Canned {
    pub status: u16,
    pub reason: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Canned {
    pub fn status(status: u16, reason: &'static str) -> Self {
        Self {
            status,
            reason,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn ok(body: &str) -> Self {
        Self {
            body: body.as_bytes().to_vec(),
            ..Self::status(200, "OK")
        }
    }

    pub fn bytes(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            ..Self::status(200, "OK")
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

#[derive(Default)]
struct State {
    script: VecDeque<Canned>,
    last: Option<Canned>,
    user_agents: Vec<String>,
}

/// Handle to a running server. The server thread lives until the process exits.
#[derive(Clone)]
pub struct ScriptedServer {
    pub url: String,
    state: Arc<Mutex<State>>,
}

impl ScriptedServer {
    pub fn start(script: Vec<Canned>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State {
            script: script.into(),
            ..Default::default()
        }));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                handle(stream, &shared);
            }
        });
        Self {
            url: format!("http://127.0.0.1:{}/termin/", port),
            state,
        }
    }

    /// Number of requests served so far.
    pub fn requests(&self) -> usize {
        self.state.lock().unwrap().user_agents.len()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.state.lock().unwrap().user_agents.clone()
    }
}

/// Returns an http URL on a port nobody listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let user_agent = request
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("user-agent"))
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default();

    let canned = {
        let mut st = state.lock().unwrap();
        st.user_agents.push(user_agent);
        let next = st.script.pop_front().or_else(|| st.last.clone());
        if let Some(c) = &next {
            st.last = Some(c.clone());
        }
        next.unwrap_or_else(|| Canned::status(500, "Internal Server Error"))
    };

    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        canned.status,
        canned.reason,
        canned.body.len()
    );
    if !canned
        .headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
    {
        head.push_str("Content-Type: text/html; charset=utf-8\r\n");
    }
    for (name, value) in &canned.headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&canned.body);
}
