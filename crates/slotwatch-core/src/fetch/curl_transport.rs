//! libcurl transport. One `Easy` handle lives for the whole session so the
//! connection to the server is reused between polls.

use super::{parse, FetchError, HttpResponse, Transport};
use crate::config::HttpConfig;
use crate::control::Sleeper;
use anyhow::{Context, Result};
use std::str;
use std::time::Duration;

pub struct CurlTransport {
    easy: curl::easy::Easy,
}

impl CurlTransport {
    pub fn new(cfg: &HttpConfig) -> Result<Self> {
        let mut easy = curl::easy::Easy::new();
        easy.get(true)?;
        easy.useragent(&cfg.user_agent)
            .context("setting user agent")?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        // Empty string: accept every encoding libcurl can decode.
        easy.accept_encoding("")?;
        easy.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))?;
        easy.timeout(Duration::from_secs(cfg.timeout_secs))?;
        // Progress callbacks are off by default; they carry the stop check.
        easy.progress(true)?;
        Ok(Self { easy })
    }
}

impl Transport for CurlTransport {
    fn get(&mut self, url: &str, stop: &dyn Sleeper) -> Result<HttpResponse, FetchError> {
        let mut headers: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        self.easy.url(url)?;
        {
            let mut transfer = self.easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.progress_function(|_, _, _, _| !stop.is_stopped())?;
            if let Err(e) = transfer.perform() {
                if e.is_aborted_by_callback() {
                    return Err(FetchError::Aborted);
                }
                return Err(e.into());
            }
        }

        let status = self.easy.response_code()?;
        Ok(HttpResponse {
            status,
            body,
            retry_after: parse::retry_after(&headers),
            charset: parse::charset(&headers),
        })
    }
}
