//! WebSocket transport for the telemetry feed.
//!
//! Connects to the feed endpoint, forwards every inbound text frame into a
//! bounded [`tokio::sync::mpsc`] queue, and drives a [`StatusTracker`].
//! There is no automatic reconnect: once a connection reaches
//! [`ConnectionState::Closed`](crate::ConnectionState::Closed), a new
//! [`FeedConnection::connect`] call is required.
//!
//! # Example
//!
//! ```rust,ignore
//! use lanwatch_api::{FeedConnection, FeedOptions, StatusTracker};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let url = Url::parse("ws://localhost:8000/ws/frontend")?;
//! let mut conn = FeedConnection::connect(url, &FeedOptions::default(), StatusTracker::new(), &CancellationToken::new())?;
//! let mut frames = conn.take_frames()?;
//!
//! while let Some(text) = frames.recv().await {
//!     println!("{text}");
//! }
//!
//! conn.close();
//! ```

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::status::StatusTracker;

// ── Defaults ─────────────────────────────────────────────────────────

pub const DEFAULT_FRAME_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const NORMAL_CLOSURE: u16 = 1000;

// ── FeedOptions ──────────────────────────────────────────────────────

/// Tuning for a single feed connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    /// Frames buffered between the socket reader and the consumer.
    /// The reader waits when the queue is full. Default: 1024.
    pub frame_queue_capacity: usize,

    /// Upper bound on the WebSocket handshake. Default: 10s.
    pub connect_timeout: Duration,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            frame_queue_capacity: DEFAULT_FRAME_QUEUE_CAPACITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

// ── FeedConnection ───────────────────────────────────────────────────

/// Handle to a running feed connection.
///
/// Dropping the handle closes the connection.
pub struct FeedConnection {
    url: Url,
    status: StatusTracker,
    generation: u64,
    frames: Option<mpsc::Receiver<String>>,
    cancel: CancellationToken,
}

impl FeedConnection {
    /// Validate the URL and spawn the connection task.
    ///
    /// Returns immediately; the handshake happens in the background and is
    /// reported through `status`. Must be called from within a Tokio runtime.
    /// Cancelling `parent` closes this connection too.
    pub fn connect(
        url: Url,
        options: &FeedOptions,
        status: StatusTracker,
        parent: &CancellationToken,
    ) -> Result<Self, Error> {
        match url.scheme() {
            "ws" | "wss" => {}
            other => return Err(Error::UnsupportedScheme(other.to_owned())),
        }
        if status.is_open() {
            return Err(Error::WebSocketConnect(
                "status tracker already belongs to an open connection".into(),
            ));
        }
        let generation = status.begin_connect();

        let (frame_tx, frame_rx) = mpsc::channel(options.frame_queue_capacity.max(1));
        let cancel = parent.child_token();

        let task_url = url.clone();
        let task_status = status.clone();
        let task_cancel = cancel.clone();
        let connect_timeout = options.connect_timeout;
        tokio::spawn(async move {
            let link = Link {
                status: task_status,
                generation,
                cancel: task_cancel,
            };
            feed_task(task_url, frame_tx, link, connect_timeout).await;
        });

        Ok(Self {
            url,
            status,
            generation,
            frames: Some(frame_rx),
            cancel,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    /// `true` while the handshake has completed and the socket is readable.
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// Hand out the inbound frame queue. There is exactly one consumer.
    pub fn take_frames(&mut self) -> Result<mpsc::Receiver<String>, Error> {
        self.frames.take().ok_or(Error::FramesTaken)
    }

    /// Close the connection. Safe to call any number of times.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!(url = %self.url, "closing feed connection");
        }
        self.cancel.cancel();
        self.status.mark_closed(self.generation);
    }
}

impl Drop for FeedConnection {
    fn drop(&mut self) {
        self.close();
    }
}

// ── Connection task ──────────────────────────────────────────────────

/// What the background task needs to report back through.
struct Link {
    status: StatusTracker,
    generation: u64,
    cancel: CancellationToken,
}

async fn feed_task(
    url: Url,
    frame_tx: mpsc::Sender<String>,
    link: Link,
    connect_timeout: Duration,
) {
    match connect_and_read(&url, &frame_tx, &link, connect_timeout).await {
        Ok(()) => tracing::info!(url = %url, "feed connection ended"),
        Err(e) => tracing::warn!(url = %url, error = %e, "feed connection failed"),
    }
    link.status.mark_closed(link.generation);
}

/// Perform the handshake, then pump text frames until the socket ends.
async fn connect_and_read(
    url: &Url,
    frame_tx: &mpsc::Sender<String>,
    link: &Link,
    connect_timeout: Duration,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to telemetry feed");
    let cancel = &link.cancel;

    let handshake = tokio::time::timeout(
        connect_timeout,
        tokio_tungstenite::connect_async(url.as_str()),
    );

    let (ws_stream, _response) = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(()),
        result = handshake => result
            .map_err(|_| Error::Timeout { timeout_secs: connect_timeout.as_secs() })?
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?,
    };

    link.status.mark_open(link.generation);
    tracing::info!("telemetry feed connected");

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = write.send(tungstenite::Message::Close(None)).await;
                return Ok(());
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        if !forward(frame_tx, text.to_string(), cancel).await {
                            let _ = write.send(tungstenite::Message::Close(None)).await;
                            return Ok(());
                        }
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite queues the pong itself
                        tracing::trace!("feed ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        return match frame {
                            Some(cf) if u16::from(cf.code) == NORMAL_CLOSURE => {
                                tracing::info!(reason = %cf.reason, "feed closed normally");
                                Ok(())
                            }
                            Some(cf) => Err(Error::WebSocketClosed {
                                code: cf.code.into(),
                                reason: cf.reason.to_string(),
                            }),
                            None => {
                                tracing::info!("feed close frame received (no payload)");
                                Ok(())
                            }
                        };
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("feed stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Pong, Frame -- not part of the feed protocol
                    }
                }
            }
        }
    }
}

/// Push one frame to the consumer. Returns `false` when the connection
/// should stop (consumer gone or cancelled while waiting for queue space).
async fn forward(
    frame_tx: &mpsc::Sender<String>,
    text: String,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        sent = frame_tx.send(text) => {
            if sent.is_err() {
                tracing::debug!("frame consumer dropped, closing feed");
            }
            sent.is_ok()
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::status::ConnectionState;

    #[test]
    fn default_options() {
        let options = FeedOptions::default();
        assert_eq!(options.frame_queue_capacity, 1024);
        assert_eq!(options.connect_timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn rejects_non_websocket_scheme() {
        let url = Url::parse("http://localhost:8000/ws/frontend").unwrap();
        let result = FeedConnection::connect(
            url,
            &FeedOptions::default(),
            StatusTracker::new(),
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(Error::UnsupportedScheme(s)) if s == "http"));
    }

    #[tokio::test]
    async fn frames_can_only_be_taken_once() {
        let url = Url::parse("ws://127.0.0.1:9/feed").unwrap();
        let mut conn = FeedConnection::connect(
            url,
            &FeedOptions::default(),
            StatusTracker::new(),
            &CancellationToken::new(),
        )
        .unwrap();

        assert!(conn.take_frames().is_ok());
        assert!(matches!(conn.take_frames(), Err(Error::FramesTaken)));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let url = Url::parse("ws://127.0.0.1:9/feed").unwrap();
        let conn = FeedConnection::connect(
            url,
            &FeedOptions::default(),
            StatusTracker::new(),
            &CancellationToken::new(),
        )
        .unwrap();

        conn.close();
        conn.close();
        assert_eq!(conn.status().state(), ConnectionState::Closed);
        assert!(!conn.is_open());
    }

    #[tokio::test]
    async fn parent_cancellation_reaches_connection() {
        let parent = CancellationToken::new();
        let url = Url::parse("ws://127.0.0.1:9/feed").unwrap();
        let conn = FeedConnection::connect(
            url,
            &FeedOptions::default(),
            StatusTracker::new(),
            &parent,
        )
        .unwrap();

        parent.cancel();
        assert!(conn.cancel.is_cancelled());
    }
}
