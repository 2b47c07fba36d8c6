// Integration tests for `FeedConnection` against a local WebSocket server.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use lanwatch_api::{ConnectionState, FeedConnection, FeedOptions, StatusTracker};

// ── Helpers ─────────────────────────────────────────────────────────

const WAIT: Duration = Duration::from_secs(5);

/// Accept one client, send `frames`, then either close or hold the socket
/// open until `release` fires.
async fn serve(
    frames: Vec<Message>,
    release: Option<oneshot::Receiver<()>>,
) -> (Url, JoinHandle<Vec<Message>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for frame in frames {
            ws.send(frame).await.unwrap();
        }

        if let Some(release) = release {
            let _ = release.await;
        } else {
            let _ = ws.close(None).await;
        }

        let mut received = Vec::new();
        while let Some(Ok(msg)) = ws.next().await {
            received.push(msg);
        }
        received
    });

    (Url::parse(&format!("ws://{addr}/ws/frontend")).unwrap(), handle)
}

async fn wait_for_state(status: &StatusTracker, wanted: ConnectionState) {
    let mut rx = status.subscribe();
    tokio::time::timeout(WAIT, rx.wait_for(|s| *s == wanted))
        .await
        .expect("timed out waiting for connection state")
        .unwrap();
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn text_frames_arrive_in_order() {
    let (url, server) = serve(
        vec![
            Message::text(r#"{"seq":1}"#),
            Message::binary(vec![0_u8, 1, 2]),
            Message::text(r#"{"seq":2}"#),
            Message::text("not json"),
        ],
        None,
    )
    .await;

    let status = StatusTracker::new();
    let mut conn = FeedConnection::connect(
        url,
        &FeedOptions::default(),
        status.clone(),
        &CancellationToken::new(),
    )
    .unwrap();
    let mut frames = conn.take_frames().unwrap();

    let mut received = Vec::new();
    while let Ok(Some(text)) = tokio::time::timeout(WAIT, frames.recv()).await {
        received.push(text);
    }

    assert_eq!(received, vec![r#"{"seq":1}"#, r#"{"seq":2}"#, "not json"]);
    wait_for_state(&status, ConnectionState::Closed).await;
    server.await.unwrap();
}

#[tokio::test]
async fn handshake_failure_ends_closed() {
    // Bind and immediately release a port so nothing is listening on it.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let status = StatusTracker::new();
    let mut conn = FeedConnection::connect(
        Url::parse(&format!("ws://{addr}/ws/frontend")).unwrap(),
        &FeedOptions::default(),
        status.clone(),
        &CancellationToken::new(),
    )
    .unwrap();
    let mut frames = conn.take_frames().unwrap();

    wait_for_state(&status, ConnectionState::Closed).await;
    assert!(!conn.is_open());
    assert!(tokio::time::timeout(WAIT, frames.recv()).await.unwrap().is_none());
}

#[tokio::test]
async fn explicit_close_sends_close_frame() {
    let (release_tx, release_rx) = oneshot::channel();
    let (url, server) = serve(vec![Message::text("hello")], Some(release_rx)).await;

    let status = StatusTracker::new();
    let mut conn = FeedConnection::connect(
        url,
        &FeedOptions::default(),
        status.clone(),
        &CancellationToken::new(),
    )
    .unwrap();
    let mut frames = conn.take_frames().unwrap();

    wait_for_state(&status, ConnectionState::Open).await;
    assert!(conn.is_open());
    assert_eq!(frames.recv().await.as_deref(), Some("hello"));

    conn.close();
    assert_eq!(status.state(), ConnectionState::Closed);
    conn.close();
    assert_eq!(status.state(), ConnectionState::Closed);

    let _ = release_tx.send(());
    let received = tokio::time::timeout(WAIT, server).await.unwrap().unwrap();
    assert!(received.iter().any(Message::is_close));
}

#[tokio::test]
async fn reconnect_requires_new_connect_call() {
    let (url, server) = serve(vec![Message::text("first")], None).await;

    let status = StatusTracker::new();
    let mut conn = FeedConnection::connect(
        url,
        &FeedOptions::default(),
        status.clone(),
        &CancellationToken::new(),
    )
    .unwrap();
    let mut frames = conn.take_frames().unwrap();
    assert_eq!(frames.recv().await.as_deref(), Some("first"));
    wait_for_state(&status, ConnectionState::Closed).await;
    server.await.unwrap();

    // Nothing reopens the tracker on its own.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(status.state(), ConnectionState::Closed);

    let (url, server) = serve(vec![Message::text("second")], None).await;
    let mut conn = FeedConnection::connect(
        url,
        &FeedOptions::default(),
        status.clone(),
        &CancellationToken::new(),
    )
    .unwrap();
    let mut frames = conn.take_frames().unwrap();
    assert_eq!(frames.recv().await.as_deref(), Some("second"));
    wait_for_state(&status, ConnectionState::Closed).await;
    server.await.unwrap();
}
