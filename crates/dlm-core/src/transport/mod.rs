//! HTTP exchange with the local daemon.
//!
//! The manager only talks to the daemon through `Transport`, which lets tests
//! substitute scripted or instrumented fakes for the curl-backed session.

mod curl_session;

pub use curl_session::CurlTransport;

use std::fmt;

/// A request relative to the daemon's base URL (`http://<host>:<port>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonRequest {
    /// Path and query, e.g. `/fsEntry/direct-link?path=My%20Doc.txt`.
    pub path_and_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl DaemonResponse {
    pub fn new(status: u32, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Could not connect (refused, DNS, reset before response).
    Connect,
    Timeout,
    /// The transport was shut down; no new requests are issued.
    Closed,
    Other,
}

/// Failure to complete an HTTP exchange (no status code was received).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TransportErrorKind::Connect => write!(f, "connect failed: {}", self.message),
            TransportErrorKind::Timeout => write!(f, "timed out: {}", self.message),
            TransportErrorKind::Closed => write!(f, "transport closed"),
            TransportErrorKind::Other => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

/// Blocking HTTP session bound to one daemon.
///
/// Calls may block; the manager runs them on tokio's blocking pool.
pub trait Transport: Send + Sync + 'static {
    /// Checks that the daemon accepts connections. Called once at open.
    fn probe(&self) -> Result<(), TransportError>;

    /// Performs one GET exchange.
    fn send(&self, request: &DaemonRequest) -> Result<DaemonResponse, TransportError>;

    /// Releases pooled connections. Later `send` calls fail with `Closed`.
    fn shutdown(&self) {}
}
