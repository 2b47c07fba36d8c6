// ── Core error types ──
//
// `DecodeError` covers a single bad frame and is always recoverable: the
// frame is dropped and ingestion continues. `CoreError` is what consumers
// see from the connection lifecycle; the `From<lanwatch_api::Error>` impl
// translates transport-layer errors into it.

use thiserror::Error;

/// Why one inbound frame could not be applied.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("malformed `{field}`: {source}")]
    Malformed {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid timestamp in `{field}`: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("inconsistent metrics: {active} active of {total} total devices")]
    InconsistentMetrics { active: u64, total: u64 },
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to feed at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Feed disconnected")]
    FeedDisconnected,

    #[error("Feed connection timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lanwatch_api::Error> for CoreError {
    fn from(err: lanwatch_api::Error) -> Self {
        match err {
            lanwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            lanwatch_api::Error::UnsupportedScheme(scheme) => CoreError::Config {
                message: format!("Unsupported feed URL scheme '{scheme}' (expected ws or wss)"),
            },
            lanwatch_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            lanwatch_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            lanwatch_api::Error::WebSocketClosed { code, reason } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket closed (code {code}): {reason}"),
            },
            lanwatch_api::Error::FramesTaken => {
                CoreError::Internal("inbound frame queue already consumed".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_map_to_domain_variants() {
        let err = CoreError::from(lanwatch_api::Error::UnsupportedScheme("http".into()));
        assert!(matches!(err, CoreError::Config { .. }));

        let err = CoreError::from(lanwatch_api::Error::Timeout { timeout_secs: 3 });
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 3 }));

        let err = CoreError::from(lanwatch_api::Error::WebSocketConnect("refused".into()));
        assert!(err.to_string().contains("refused"));
    }
}
