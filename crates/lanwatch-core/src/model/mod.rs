// ── Dashboard domain model ──
//
// Canonical types the engine keeps in its state and hands to consumers.
// Raw wire shapes live in `lanwatch_api::wire`; `crate::convert` bridges
// the two.

pub mod device;
pub mod event;
pub mod metrics;

// ── Re-exports ──────────────────────────────────────────────────────

pub use device::{Device, DeviceStatus, PLACEHOLDER, UNKNOWN};
pub use event::{DomainEvent, EnvelopeMeta, EventKind};
pub use metrics::{ArpHistoryPoint, MetricsSample, MetricsSnapshot};

/// Local wall-clock rendering used for every timestamp shown on the dashboard.
pub(crate) fn clock_time(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.with_timezone(&chrono::Local).format("%H:%M:%S").to_string()
}
