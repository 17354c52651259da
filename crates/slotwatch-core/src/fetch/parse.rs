//! Parse the response header lines collected during a transfer.

use std::time::Duration;

/// Header lines of the final response. With redirects followed, curl reports
/// every hop's headers; only the block after the last status line counts.
fn final_block(lines: &[String]) -> &[String] {
    let start = lines
        .iter()
        .rposition(|l| l.starts_with("HTTP/"))
        .map(|i| i + 1)
        .unwrap_or(0);
    &lines[start..]
}

/// `Retry-After` as delta-seconds. HTTP-date values are ignored.
pub(crate) fn retry_after(lines: &[String]) -> Option<Duration> {
    final_block(lines).iter().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case("retry-after") {
            return None;
        }
        value.trim().parse::<u64>().ok().map(Duration::from_secs)
    })
}

/// `charset` parameter of `Content-Type`, quotes stripped.
pub(crate) fn charset(lines: &[String]) -> Option<String> {
    final_block(lines).iter().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case("content-type") {
            return None;
        }
        value.split(';').skip(1).find_map(|param| {
            let (key, val) = param.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("charset") {
                return None;
            }
            let val = val.trim().trim_matches('"');
            (!val.is_empty()).then(|| val.to_string())
        })
    })
}
