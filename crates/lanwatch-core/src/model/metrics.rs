// ── Network-wide counters ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest periodic counter snapshot from the feed.
///
/// Replaced wholesale on every sample, never merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_devices: u64,
    pub active_devices: u64,
    pub data_sent: u64,
    pub data_received: u64,
    pub broadcast_packets: u64,
    pub unicast_packets: u64,
    pub arp_requests: u64,
    pub arp_replies: u64,
}

impl MetricsSnapshot {
    pub fn idle_devices(&self) -> u64 {
        self.total_devices.saturating_sub(self.active_devices)
    }

    /// Fraction of packets that were broadcast, or `None` before any traffic.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn broadcast_share(&self) -> Option<f64> {
        let total = self.broadcast_packets.checked_add(self.unicast_packets)?;
        if total == 0 {
            return None;
        }
        Some(self.broadcast_packets as f64 / total as f64)
    }
}

/// A decoded periodic sample: counters plus the time they were measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSample {
    #[serde(flatten)]
    pub snapshot: MetricsSnapshot,
    pub measured_at: DateTime<Utc>,
}

/// One point of the rolling ARP request history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArpHistoryPoint {
    pub measured_at: DateTime<Utc>,
    pub arp_requests: u64,
}
