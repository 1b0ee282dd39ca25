//! libcurl-backed session with a pool of keep-alive handles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use curl::easy::Easy;

use super::{DaemonRequest, DaemonResponse, Transport, TransportError, TransportErrorKind};

/// HTTP session to `http://<host>:<port>`.
///
/// Each `curl::easy::Easy` keeps its connection open between transfers, so
/// handles are pooled and reused across requests instead of reconnecting.
pub struct CurlTransport {
    base_url: String,
    connect_timeout: Duration,
    request_timeout: Duration,
    pool: Mutex<Vec<Easy>>,
    closed: AtomicBool,
}

impl CurlTransport {
    pub fn new(host: &str, port: u16, connect_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            base_url: format!("http://{}:{}", host, port),
            connect_timeout,
            request_timeout,
            pool: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn checkout(&self) -> Easy {
        let pooled = self
            .pool
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop();
        pooled.unwrap_or_else(Easy::new)
    }

    /// Returns a handle to the pool unless the session was shut down meanwhile,
    /// in which case dropping it closes its socket.
    fn checkin(&self, easy: Easy) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        self.pool
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(easy);
    }

    /// Opens and immediately drops a TCP connection to the daemon.
    fn connect_only(&self) -> Result<(), curl::Error> {
        let mut easy = Easy::new();
        easy.url(&self.base_url)?;
        easy.signal(false)?;
        easy.connect_only(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.perform()
    }

    fn perform(&self, easy: &mut Easy, url: &str) -> Result<DaemonResponse, curl::Error> {
        easy.url(url)?;
        easy.get(true)?;
        easy.signal(false)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.request_timeout)?;

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        Ok(DaemonResponse { status, body })
    }
}

impl Transport for CurlTransport {
    fn probe(&self) -> Result<(), TransportError> {
        self.connect_only().map_err(|e| classify_curl_error(&e))
    }

    fn send(&self, request: &DaemonRequest) -> Result<DaemonResponse, TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::new(TransportErrorKind::Closed, "session closed"));
        }
        let url = format!("{}{}", self.base_url, request.path_and_query);
        let mut easy = self.checkout();
        match self.perform(&mut easy, &url) {
            Ok(resp) => {
                self.checkin(easy);
                Ok(resp)
            }
            // A failed handle may hold a half-closed connection; let it drop.
            Err(e) => Err(classify_curl_error(&e)),
        }
    }

    fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        let drained = std::mem::take(&mut *self.pool.lock().unwrap_or_else(|e| e.into_inner()));
        tracing::debug!("closing {} pooled daemon connection(s)", drained.len());
    }
}

/// Classify a curl error into a transport error kind.
fn classify_curl_error(e: &curl::Error) -> TransportError {
    if e.is_operation_timedout() {
        return TransportError::new(TransportErrorKind::Timeout, e.to_string());
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return TransportError::new(TransportErrorKind::Connect, e.to_string());
    }
    TransportError::new(TransportErrorKind::Other, e.to_string())
}
