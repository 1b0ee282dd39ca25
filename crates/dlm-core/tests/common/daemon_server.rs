//! Minimal HTTP/1.1 server standing in for the filespace daemon in integration tests.
//!
//! Routes are keyed by the exact request target (path plus query). Each route
//! holds a script of replies; the last reply repeats once the script runs out.
//! Unknown targets get 404. Every response closes its connection.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 with a v3 `{"result": ...}` body.
    pub fn v3_link(link: &str) -> Self {
        Self::json(200, format!(r#"{{"result":"{}"}}"#, link))
    }

    /// 200 with a v2 `{"id": ...}` body.
    pub fn v2_id(id: &str) -> Self {
        Self::json(200, format!(r#"{{"id":"{}"}}"#, id))
    }
}

#[derive(Default)]
struct Routes {
    scripts: HashMap<String, Vec<Reply>>,
    hits: HashMap<String, usize>,
}

pub struct DaemonServer {
    pub port: u16,
    routes: Arc<Mutex<Routes>>,
}

impl DaemonServer {
    /// Number of requests received for `target`.
    pub fn hits(&self, target: &str) -> usize {
        let routes = self.routes.lock().unwrap();
        routes.hits.get(target).copied().unwrap_or(0)
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(routes: Vec<(String, Vec<Reply>)>) -> DaemonServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(Mutex::new(Routes {
        scripts: routes.into_iter().collect(),
        hits: HashMap::new(),
    }));
    let shared = Arc::clone(&routes);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    DaemonServer { port, routes }
}

/// A port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().unwrap().port()
}

fn handle(mut stream: TcpStream, routes: &Mutex<Routes>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let Some((method, target)) = parse_request_line(request) else {
        return;
    };
    let reply = if method.eq_ignore_ascii_case("GET") {
        next_reply(routes, target)
    } else {
        Reply::json(405, "")
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason(reply.status),
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn next_reply(routes: &Mutex<Routes>, target: &str) -> Reply {
    let mut routes = routes.lock().unwrap();
    *routes.hits.entry(target.to_string()).or_insert(0) += 1;
    match routes.scripts.get_mut(target) {
        Some(script) if script.len() > 1 => script.remove(0),
        Some(script) if !script.is_empty() => script[0].clone(),
        _ => Reply::json(404, r#"{"error":"no such entry"}"#),
    }
}

/// Returns (method, target) from the request line.
fn parse_request_line(request: &str) -> Option<(&str, &str)> {
    let line = request.lines().next()?;
    let mut parts = line.split_whitespace();
    Some((parts.next()?, parts.next()?))
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
