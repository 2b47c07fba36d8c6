// lanwatch-api: WebSocket transport and raw wire types for the telemetry feed.

pub mod error;
pub mod status;
pub mod websocket;
pub mod wire;

pub use error::Error;
pub use status::{ConnectionState, StatusTracker};
pub use websocket::{FeedConnection, FeedOptions};
pub use wire::{WireDevice, WireMessage, WireMeta, WireMetrics};
