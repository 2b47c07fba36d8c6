// ── Monitor ──
//
// Lifecycle of one live dashboard: opens the feed connection, runs the
// ingest loop on a background task, and exposes the reactive state.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lanwatch_api::{ConnectionState, FeedConnection, StatusTracker};

use crate::config::{EngineConfig, FeedConfig};
use crate::error::CoreError;
use crate::ingest::{IngestReport, run_ingest};
use crate::store::StateStore;
use crate::stream::StateStream;

/// Entry point for consumers of a live feed.
///
/// Cheaply cloneable via `Arc<MonitorInner>`. The state store outlives
/// individual connections, so a reconnect continues from the state the
/// previous connection left behind.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    feed: FeedConfig,
    store: Arc<StateStore>,
    status: StatusTracker,
    cancel: CancellationToken,
    session: Mutex<Option<Session>>,
}

/// One connection and the ingest task draining it.
struct Session {
    connection: FeedConnection,
    ingest: JoinHandle<IngestReport>,
}

impl Drop for MonitorInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Monitor {
    pub fn new(feed: FeedConfig, engine: EngineConfig) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                feed,
                store: Arc::new(StateStore::new(engine)),
                status: StatusTracker::new(),
                cancel: CancellationToken::new(),
                session: Mutex::new(None),
            }),
        }
    }

    pub fn feed_config(&self) -> &FeedConfig {
        &self.inner.feed
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open the feed and start ingesting.
    ///
    /// Returns once the connection task is spawned; the handshake result is
    /// reported through [`connection_state`](Self::connection_state). Calling
    /// this while a connection is live is a no-op. After the connection has
    /// closed, calling it again opens a fresh one.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let mut session = self.inner.session.lock().await;

        if session.is_some() && self.inner.status.state() != ConnectionState::Closed {
            debug!("feed connection already live");
            return Ok(());
        }
        if let Some(stale) = session.take() {
            finish(stale).await;
        }

        let feed = &self.inner.feed;
        let mut connection = FeedConnection::connect(
            feed.url.clone(),
            &feed.options,
            self.inner.status.clone(),
            &self.inner.cancel,
        )?;
        let frames = ReceiverStream::new(connection.take_frames()?);

        let store = Arc::clone(&self.inner.store);
        let cancel = self.inner.cancel.clone();
        let ingest = tokio::spawn(async move { run_ingest(&store, frames, &cancel).await });

        info!(url = %feed.url, "feed session started");
        *session = Some(Session { connection, ingest });
        Ok(())
    }

    /// Close the feed and wait for queued frames to be applied.
    ///
    /// Returns the ingest report of the closed session, or `None` when no
    /// session was running. Safe to call repeatedly.
    pub async fn disconnect(&self) -> Option<IngestReport> {
        let session = self.inner.session.lock().await.take()?;
        let report = finish(session).await;
        debug!("disconnected");
        report
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.status.subscribe()
    }

    pub fn is_open(&self) -> bool {
        self.inner.status.is_open()
    }

    /// Whether the latest connection completed its handshake at some point.
    pub fn was_opened(&self) -> bool {
        self.inner.status.was_opened()
    }

    /// Subscribe to dashboard state changes.
    pub fn subscribe(&self) -> StateStream {
        self.inner.store.subscribe()
    }
}

async fn finish(session: Session) -> Option<IngestReport> {
    session.connection.close();
    match session.ingest.await {
        Ok(report) => {
            info!(
                applied = report.applied,
                ignored = report.ignored,
                rejected = report.rejected,
                "feed session ended"
            );
            Some(report)
        }
        Err(e) => {
            warn!(error = %e, "ingest task failed");
            None
        }
    }
}
