// ── Central reactive state store ──
//
// Holds the current `DashboardState` behind a `watch` channel. The ingest
// loop is the only writer; readers take cheap `Arc` snapshots or subscribe
// for change notifications.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::config::EngineConfig;
use crate::convert::{Inbound, decode};
use crate::engine::DashboardState;
use crate::model::{ArpHistoryPoint, Device, DomainEvent, MetricsSnapshot};
use crate::page::Page;
use crate::stream::StateStream;

/// What happened to one ingested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum IngestOutcome {
    /// Decoded and applied; subscribers were notified.
    Applied,
    /// Well-formed but of a kind the engine does not handle.
    Ignored,
    /// Could not be decoded. State is untouched.
    Rejected,
}

/// Central reactive store for the dashboard state.
pub struct StateStore {
    state: watch::Sender<Arc<DashboardState>>,
    last_frame_at: watch::Sender<Option<DateTime<Utc>>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl StateStore {
    pub fn new(config: EngineConfig) -> Self {
        let (state, _) = watch::channel(Arc::new(DashboardState::new(config)));
        let (last_frame_at, _) = watch::channel(None);
        Self {
            state,
            last_frame_at,
        }
    }

    // ── Ingestion ────────────────────────────────────────────────────

    /// Decode one text frame and apply it, using `now` as ingestion time.
    pub fn ingest(&self, text: &str, now: DateTime<Utc>) -> IngestOutcome {
        self.last_frame_at.send_replace(Some(now));

        let inbound = match decode(text) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::warn!(error = %e, frame_len = text.len(), "dropping undecodable frame");
                return IngestOutcome::Rejected;
            }
        };

        if let Inbound::Ignored { kind, subtype } = &inbound {
            tracing::debug!(%kind, %subtype, "ignoring unhandled message kind");
            return IngestOutcome::Ignored;
        }

        self.apply(&inbound, now);
        IngestOutcome::Applied
    }

    /// Apply an already-decoded message and notify subscribers.
    pub fn apply(&self, inbound: &Inbound, now: DateTime<Utc>) {
        if inbound.is_ignored() {
            return;
        }
        let next = self.state.borrow().apply(inbound, now);
        tracing::trace!(applied = next.applied(), sequence = ?next.last_sequence(), "state updated");
        self.state.send_replace(Arc::new(next));
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<DashboardState> {
        self.state.borrow().clone()
    }

    pub fn devices_snapshot(&self) -> Vec<Device> {
        self.state.borrow().devices().to_vec()
    }

    pub fn events_snapshot(&self) -> Vec<DomainEvent> {
        self.state.borrow().events().to_vec()
    }

    pub fn events_page(&self, page: usize, page_size: usize) -> Page<DomainEvent> {
        self.state.borrow().events_page(page, page_size)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        *self.state.borrow().metrics()
    }

    pub fn arp_rate(&self) -> u64 {
        self.state.borrow().arp_rate()
    }

    pub fn arp_history(&self) -> Vec<ArpHistoryPoint> {
        self.state.borrow().arp_history().iter().copied().collect()
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn active_devices(&self) -> u64 {
        self.state.borrow().active_devices()
    }

    pub fn idle_devices(&self) -> u64 {
        self.state.borrow().idle_devices()
    }

    pub fn device_count(&self) -> usize {
        self.state.borrow().devices().len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.state.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// Ingestion time of the most recent frame, decodable or not.
    pub fn last_frame_at(&self) -> Option<DateTime<Utc>> {
        *self.last_frame_at.borrow()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const JOIN: &str = r#"{"type":"TOPOLOGY","subtype":"DEVICE_JOINED","meta":{"sequence":1,"timestamp":"2026-02-10T12:00:00Z"},"payload":{"device":{"device_id":"a","ip_address":"10.0.0.2"}}}"#;

    #[test]
    fn ingest_reports_outcomes() {
        let store = StateStore::default();
        let now = Utc::now();

        assert_eq!(store.ingest(JOIN, now), IngestOutcome::Applied);
        assert_eq!(store.ingest("{broken", now), IngestOutcome::Rejected);
        assert_eq!(
            store.ingest(r#"{"type":"ALERT","subtype":"X"}"#, now),
            IngestOutcome::Ignored
        );

        assert_eq!(store.device_count(), 1);
        assert_eq!(store.events_snapshot().len(), 1);
        assert_eq!(store.last_frame_at(), Some(now));
    }

    #[test]
    fn rejected_frame_does_not_notify() {
        let store = StateStore::default();
        let stream = store.subscribe();
        let before = stream.latest();

        store.ingest("not json", Utc::now());
        assert!(Arc::ptr_eq(&before, &stream.latest()));
    }

    #[tokio::test]
    async fn subscribers_see_applied_frames() {
        let store = StateStore::default();
        let mut stream = store.subscribe();
        assert!(stream.current().devices().is_empty());

        store.ingest(JOIN, Utc::now());
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.devices().len(), 1);
        assert_eq!(stream.current().devices()[0].ip, "10.0.0.2");
    }
}
