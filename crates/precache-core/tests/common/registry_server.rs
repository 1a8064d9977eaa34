//! Minimal HTTP/1.1 server standing in for the registry in integration tests.
//!
//! Serves canned responses keyed by request target (path + query). HEAD gets
//! the status and Content-Length without a body; unknown targets get 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Handle to a running server.
pub struct RegistryServer {
    /// e.g. `127.0.0.1:41234`
    pub host: String,
    /// Request lines seen so far, e.g. `HEAD /plugin/a.1.0.zip`.
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl RegistryServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.host)
    }

    pub fn url(&self, target: &str) -> String {
        format!("http://{}{}", self.host, target)
    }

    pub fn request_count(&self, method: &str, target: &str) -> usize {
        let line = format!("{method} {target}");
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| **r == line)
            .count()
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(routes: HashMap<String, Route>) -> RegistryServer {
    start_with(|_| routes)
}

/// Like `start`, but the routes are built once the listening host is known,
/// so bodies can link back to the server itself.
pub fn start_with(build: impl FnOnce(&str) -> HashMap<String, Route>) -> RegistryServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let host = format!("127.0.0.1:{port}");
    let routes = Arc::new(build(&host));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let seen = Arc::clone(&seen);
            thread::spawn(move || handle(stream, &routes, &seen));
        }
    });
    RegistryServer { host, requests }
}

fn handle(
    mut stream: std::net::TcpStream,
    routes: &HashMap<String, Route>,
    seen: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf);
    let Some(first) = request.lines().next() else {
        return;
    };
    let mut parts = first.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("").to_string();
    seen.lock().unwrap().push(format!("{method} {target}"));

    let not_found = Route::status(404, b"{\"error\":\"Not found.\"}".to_vec());
    let route = routes.get(&target).unwrap_or(&not_found);
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        route.status,
        reason(route.status),
        route.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    if !method.eq_ignore_ascii_case("HEAD") {
        let _ = stream.write_all(&route.body);
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
