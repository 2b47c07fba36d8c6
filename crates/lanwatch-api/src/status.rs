// ── Connection status tracking ──
//
// Three-state machine for the feed connection. The current state is held in
// a `watch` channel, so consumers can either query it synchronously or
// await transitions instead of sampling on a timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Lifecycle of a single feed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionState {
    /// Handshake in progress (initial state).
    Connecting,
    /// Handshake completed; frames are flowing.
    Open,
    /// Closed by error, remote close, or an explicit `close()`.
    Closed,
}

impl ConnectionState {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Shared handle to the connection state.
///
/// Cheap to clone; every clone observes the same state. Only the transport
/// moves it forward. Each `connect` call starts a new generation, and
/// transitions reported by an older connection are ignored.
#[derive(Debug, Clone)]
pub struct StatusTracker {
    state: Arc<watch::Sender<ConnectionState>>,
    generation: Arc<AtomicU64>,
    /// Last generation whose handshake completed. 0 = none.
    opened: Arc<AtomicU64>,
}

impl StatusTracker {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Connecting);
        Self {
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            opened: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current state, read synchronously.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// `true` once the current connection attempt has completed its
    /// handshake, even if it has closed since.
    ///
    /// A `watch` receiver only holds the latest value, so a connection that
    /// opens and closes between two polls is never seen as `Open` there.
    pub fn was_opened(&self) -> bool {
        let generation = self.generation.load(Ordering::SeqCst);
        generation != 0 && self.opened.load(Ordering::SeqCst) == generation
    }

    /// Receive every subsequent transition.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Start a new connection attempt and return its generation.
    pub(crate) fn begin_connect(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connecting {
                false
            } else {
                *state = ConnectionState::Connecting;
                true
            }
        });
        generation
    }

    /// `Connecting` → `Open`. A closed connection never reopens here.
    pub(crate) fn mark_open(&self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connecting {
                self.opened.store(generation, Ordering::SeqCst);
                *state = ConnectionState::Open;
                true
            } else {
                false
            }
        })
    }

    /// Any state → `Closed`. No-op (and no notification) when already closed.
    pub(crate) fn mark_closed(&self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Closed {
                false
            } else {
                *state = ConnectionState::Closed;
                true
            }
        })
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}
