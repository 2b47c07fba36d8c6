// lanwatch-core: Streaming state-reconciliation engine for the lanwatch dashboard.
//
// Decodes telemetry feed frames, reconciles them into an immutable
// `DashboardState`, and publishes snapshots to subscribers.

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod model;
pub mod monitor;
pub mod page;
pub mod rate;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────

pub use config::{EngineConfig, FeedConfig};
pub use convert::{Inbound, decode};
pub use engine::DashboardState;
pub use error::{CoreError, DecodeError};
pub use ingest::{IngestReport, run_ingest};
pub use monitor::Monitor;
pub use page::{Page, paginate};
pub use rate::{RateEstimator, RateSample};
pub use store::{IngestOutcome, StateStore};
pub use stream::{StateStream, StateWatchStream};

// Re-export model types at the crate root for convenience.
pub use model::{
    ArpHistoryPoint, Device, DeviceStatus, DomainEvent, EnvelopeMeta, EventKind, MetricsSample,
    MetricsSnapshot,
};

// Transport types consumers need alongside the monitor.
pub use lanwatch_api::{ConnectionState, FeedOptions};
