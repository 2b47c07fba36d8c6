// ── Event log entries ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::MetricsSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum EventKind {
    Join,
    /// Reserved; leave notifications are logged as `Join`.
    Leave,
    /// Reserved; nothing on the feed produces it yet.
    Reassign,
    /// Reserved; nothing on the feed produces it yet.
    Inactive,
    Metric,
}

/// Identity fields every applied message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
}

/// One human-readable line in the dashboard's event feed.
///
/// `id` is the originating message's sequence number. Events are never
/// mutated once logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: String,
    pub kind: EventKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<MetricsSample>,
}

impl DomainEvent {
    /// Local clock time of the originating message.
    pub fn display_time(&self) -> String {
        super::clock_time(self.timestamp)
    }
}
