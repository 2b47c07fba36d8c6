use thiserror::Error;

/// Top-level error type for the `lanwatch-api` crate.
///
/// Transport failures after the connection is up are not returned to
/// callers; they only show up as a [`ConnectionState::Closed`] transition.
/// `lanwatch-core` maps these into its own error type.
///
/// [`ConnectionState::Closed`]: crate::ConnectionState::Closed
#[derive(Debug, Error)]
pub enum Error {
    // ── Addressing ──────────────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The feed endpoint is not a WebSocket URL.
    #[error("Unsupported URL scheme '{0}' (expected ws or wss)")]
    UnsupportedScheme(String),

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket handshake or read failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// The handshake did not finish in time.
    #[error("WebSocket handshake timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// WebSocket closed by the remote end.
    #[error("WebSocket closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },

    // ── Usage ───────────────────────────────────────────────────────
    /// The inbound frame queue has a single consumer and was already handed out.
    #[error("Inbound frame queue was already taken")]
    FramesTaken,
}
