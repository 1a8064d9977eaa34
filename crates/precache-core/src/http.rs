//! Small in-memory HTTP GET over libcurl, used for registry metadata and
//! `.md5` reference files. Artifact transfers go through `fetcher` instead.

use std::time::Duration;

/// Upper bound on buffered response bodies; metadata responses are small.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Status and body of a completed GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs a GET and buffers the body. Any status is returned as-is;
/// only transport failures are errors.
pub fn get(url: &str, headers: &[(&str, &str)], timeout: Duration) -> Result<HttpResponse, curl::Error> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(timeout.min(Duration::from_secs(15)))?;
    easy.timeout(timeout)?;
    easy.useragent(user_agent())?;

    let mut list = curl::easy::List::new();
    for (k, v) in headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !headers.is_empty() {
        easy.http_headers(list)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if body.len() + data.len() > MAX_BODY_BYTES {
                return Ok(0); // abort oversized bodies
            }
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(HttpResponse { status, body })
}

/// User-Agent sent with every request.
pub fn user_agent() -> &'static str {
    concat!("wp-precache/", env!("CARGO_PKG_VERSION"))
}
