//! Direct link manager: session lifecycle plus single and batch resolution.
//!
//! A manager owns one daemon session. Each path is normalized, turned into a
//! version-specific request, sent through the transport under the retry
//! policy, and parsed back into a link. Batches run through the concurrency
//! gate so no more than `max_workers` resolutions are in flight.
//!
//! Handles are cheap clones of one shared session. `close()` (or dropping
//! the last handle) shuts the transport; calls made afterwards fail with
//! `ConfigError::Closed`, and a batch in flight at that moment is cancelled
//! with the same error.

mod result;


pub use result::{LinkRequest, LinkResult};

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::adapter::{ApiVersion, VersionAdapter};
use crate::config::ManagerConfig;
use crate::error::{ConfigError, LinkError};
use crate::gate::ConcurrencyGate;
use crate::path;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::transport::{CurlTransport, DaemonRequest, Transport, TransportErrorKind};

#[derive(Clone)]
pub struct DirectLinkManager {
    session: Arc<Session>,
}

struct Session {
    config: ManagerConfig,
    adapter: VersionAdapter,
    policy: RetryPolicy,
    gate: ConcurrencyGate,
    transport: Arc<dyn Transport>,
    /// `true` once closed; batches watch it to cancel outstanding work.
    closed: watch::Sender<bool>,
}

impl Drop for Session {
    fn drop(&mut self) {
        if !*self.closed.borrow() {
            self.transport.shutdown();
        }
    }
}

impl DirectLinkManager {
    /// Validates `config` and opens a curl session to the daemon.
    pub async fn open(config: ManagerConfig) -> Result<Self, LinkError> {
        config.validate()?;
        let transport = CurlTransport::new(
            &config.host,
            config.port,
            config.connect_timeout(),
            config.request_timeout(),
        );
        Self::open_with_transport(config, Arc::new(transport)).await
    }

    /// Like `open`, over a caller-supplied transport.
    ///
    /// Configuration is validated before the transport is touched. The daemon
    /// is probed once; an unreachable daemon is a `Connection` error and is
    /// not retried.
    pub async fn open_with_transport(
        config: ManagerConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, LinkError> {
        config.validate()?;
        let adapter = VersionAdapter::new(config.api_version()?, config.filespace.as_deref())?;

        let probe = Arc::clone(&transport);
        tokio::task::spawn_blocking(move || probe.probe())
            .await
            .map_err(|e| LinkError::Connection(format!("probe task: {}", e)))?
            .map_err(|e| LinkError::Connection(e.to_string()))?;

        tracing::info!(
            "opened daemon session on port {} ({}, mount {}, {} workers)",
            config.port,
            adapter.version(),
            config.mount_point,
            config.max_workers
        );

        let (closed, _) = watch::channel(false);
        let session = Session {
            policy: config.retry_policy(),
            gate: ConcurrencyGate::new(config.max_workers),
            adapter,
            transport,
            closed,
            config,
        };
        Ok(Self {
            session: Arc::new(session),
        })
    }

    /// Opens a manager, hands it to `f`, and closes it once `f` finishes,
    /// whether it succeeded or not.
    pub async fn scoped<F, Fut, T>(config: ManagerConfig, f: F) -> Result<T, LinkError>
    where
        F: FnOnce(DirectLinkManager) -> Fut,
        Fut: Future<Output = Result<T, LinkError>>,
    {
        Self::open(config).await?.with_session(f).await
    }

    /// Runs `f` with this manager, then closes it.
    pub async fn with_session<F, Fut, T>(self, f: F) -> Result<T, LinkError>
    where
        F: FnOnce(DirectLinkManager) -> Fut,
        Fut: Future<Output = Result<T, LinkError>>,
    {
        let handle = self.clone();
        let out = f(self).await;
        handle.close();
        out
    }

    /// Shuts the session down. Idempotent.
    pub fn close(&self) {
        if self.session.closed.send_replace(true) {
            return;
        }
        self.session.transport.shutdown();
        tracing::info!("closed daemon session on port {}", self.session.config.port);
    }

    pub fn is_closed(&self) -> bool {
        *self.session.closed.borrow()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.session.config
    }

    pub fn version(&self) -> ApiVersion {
        self.session.adapter.version()
    }

    /// Resolves one path, returning its error directly.
    pub async fn get_direct_link(&self, path: &str) -> Result<String, LinkError> {
        let mut results = self.get_direct_link_batch([path]).await?;
        match results.pop() {
            Some(result) => result.outcome,
            None => Err(LinkError::TaskFailed("batch returned no result".to_string())),
        }
    }

    /// Resolves every path, one `LinkResult` per input, in input order.
    ///
    /// Per-path failures are recorded in that path's result. The call itself
    /// fails only when the manager is closed before or during the batch.
    pub async fn get_direct_link_batch<I, S>(&self, paths: I) -> Result<Vec<LinkResult>, LinkError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_open()?;
        let requests: Vec<LinkRequest> = paths.into_iter().map(|p| LinkRequest::new(p)).collect();
        tracing::debug!("resolving batch of {} path(s)", requests.len());

        let closed = self.session.closed.subscribe();
        let batch = self.session.gate.run(requests.clone(), |request| {
            Session::resolve(Arc::clone(&self.session), request.raw_path)
        });
        let outcomes = tokio::select! {
            biased;
            _ = wait_closed(closed) => {
                tracing::warn!("manager closed with resolutions outstanding; batch cancelled");
                return Err(ConfigError::Closed.into());
            }
            outcomes = batch => outcomes,
        };
        // A session closed underneath a task aborts the whole call.
        if let Some(Ok(Err(e))) = outcomes
            .iter()
            .find(|o| matches!(o, Ok(Err(LinkError::Config(_)))))
        {
            return Err(e.clone());
        }

        let results = requests
            .into_iter()
            .zip(outcomes)
            .map(|(request, outcome)| {
                let outcome = outcome.unwrap_or_else(|failed| Err(LinkError::TaskFailed(failed.0)));
                if let Err(e) = &outcome {
                    tracing::warn!("no direct link for {}: {}", request.raw_path, e);
                }
                LinkResult { request, outcome }
            })
            .collect();
        Ok(results)
    }

    /// Builds a link from a known filesystem entry id without querying the
    /// daemon. Only available with API v2.
    pub fn link_for_entry(&self, entry_id: &str) -> Result<String, LinkError> {
        self.ensure_open()?;
        Ok(self.session.adapter.link_for_entry(entry_id)?)
    }

    fn ensure_open(&self) -> Result<(), LinkError> {
        if self.is_closed() {
            return Err(ConfigError::Closed.into());
        }
        Ok(())
    }
}

impl Session {
    fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    async fn resolve(session: Arc<Session>, raw_path: String) -> Result<String, LinkError> {
        let normalized = path::normalize(&raw_path, &session.config.mount_point)?;
        let request = session.adapter.build_request(&normalized.encoded_path);
        run_with_retry(&session.policy, &normalized.relative_path, |_attempt| {
            Arc::clone(&session).exchange(request.clone())
        })
        .await
    }

    /// One HTTP round trip, run on the blocking pool.
    async fn exchange(self: Arc<Self>, request: DaemonRequest) -> Result<String, LinkError> {
        if self.is_closed() {
            return Err(ConfigError::Closed.into());
        }
        let transport = Arc::clone(&self.transport);
        let response = tokio::task::spawn_blocking(move || transport.send(&request))
            .await
            .map_err(|e| LinkError::TaskFailed(e.to_string()))?
            .map_err(|e| match e.kind {
                TransportErrorKind::Closed => LinkError::Config(ConfigError::Closed),
                _ => LinkError::transient(e.to_string()),
            })?;
        self.adapter.parse_response(response.status, &response.body)
    }
}

/// Resolves once the session is marked closed.
async fn wait_closed(mut closed: watch::Receiver<bool>) {
    loop {
        if *closed.borrow_and_update() {
            return;
        }
        if closed.changed().await.is_err() {
            // Sender gone means the session was dropped; nothing left to cancel.
            std::future::pending::<()>().await;
        }
    }
}
