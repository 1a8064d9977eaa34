//! HTTP HEAD existence probing.
//!
//! Uses the curl crate (libcurl) to ask for headers only. The status decides
//! whether a candidate download exists; `Content-Length` is kept for logging.

mod parse;

use std::str;
use std::time::Duration;

/// Result of a HEAD request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResult {
    /// Final HTTP status after redirects.
    pub status: u32,
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
}

impl HeadResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a HEAD request and returns the status plus parsed metadata.
///
/// Follows redirects. Non-2xx statuses are not errors here; callers decide.
pub fn probe(url: &str, timeout: Duration) -> Result<HeadResult, curl::Error> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.nobody(true)?; // HEAD request
    easy.follow_location(true)?;
    easy.connect_timeout(timeout.min(Duration::from_secs(15)))?;
    easy.timeout(timeout)?;
    easy.useragent(crate::http::user_agent())?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                let line = s.trim_end();
                // A new status line starts the headers of a redirect target.
                if line.starts_with("HTTP/") {
                    headers.clear();
                }
                headers.push(line.to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(HeadResult {
        status,
        content_length: parse::content_length(&headers),
    })
}
