// ── Runtime engine configuration ──
//
// These types describe how much history the engine keeps and where the
// feed lives. They never touch disk: `lanwatch-config` (or a test) builds
// them and hands them in.

use std::time::Duration;

use lanwatch_api::FeedOptions;
use url::Url;

pub const DEFAULT_FEED_URL: &str = "ws://localhost:8000/ws/frontend";
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 500;
pub const DEFAULT_ARP_HISTORY_CAPACITY: usize = 60;
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Retention limits for the derived state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Newest events kept in the log; older ones are evicted. 0 = unbounded.
    pub event_log_capacity: usize,
    /// ARP history points kept for charting. 0 disables the history.
    pub arp_history_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_log_capacity: DEFAULT_EVENT_LOG_CAPACITY,
            arp_history_capacity: DEFAULT_ARP_HISTORY_CAPACITY,
        }
    }
}

/// Where and how to connect to the telemetry feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub url: Url,
    pub options: FeedOptions,
}

impl FeedConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            options: FeedOptions::default(),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    pub fn with_frame_queue_capacity(mut self, capacity: usize) -> Self {
        self.options.frame_queue_capacity = capacity;
        self
    }
}
