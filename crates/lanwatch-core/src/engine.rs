// ── Reconciliation engine ──
//
// `DashboardState` is the whole derived dashboard: device registry, event
// log, metrics snapshot, and ARP signals. Applying an inbound message never
// mutates the receiver; it yields the next state value.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::convert::{Inbound, map_join_event, map_metric_event};
use crate::model::{
    ArpHistoryPoint, Device, DeviceStatus, DomainEvent, EnvelopeMeta, MetricsSample,
    MetricsSnapshot,
};
use crate::page::{Page, paginate};
use crate::rate::RateEstimator;

/// Immutable snapshot of everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardState {
    /// Device registry, most recently joined first. At most one entry per id.
    devices: Vec<Device>,
    /// Event log, newest first.
    events: Vec<DomainEvent>,
    metrics: MetricsSnapshot,
    #[serde(skip)]
    rate: RateEstimator,
    arp_rate: u64,
    /// ARP request counters per sample, oldest first.
    arp_history: VecDeque<ArpHistoryPoint>,
    applied: u64,
    last_sequence: Option<u64>,
    #[serde(skip)]
    config: EngineConfig,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl DashboardState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            devices: Vec::new(),
            events: Vec::new(),
            metrics: MetricsSnapshot::default(),
            rate: RateEstimator::new(),
            arp_rate: 0,
            arp_history: VecDeque::new(),
            applied: 0,
            last_sequence: None,
            config,
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Apply one message, received at wall-clock time `now`.
    ///
    /// Ignored messages return an identical state.
    #[must_use]
    pub fn apply(&self, inbound: &Inbound, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        match inbound {
            Inbound::DeviceJoined { meta, device } => next.device_joined(meta, device, now),
            Inbound::DeviceLeft { meta, device } => next.device_left(meta, device, now),
            Inbound::PeriodicMetric { meta, sample } => next.periodic_metric(meta, sample, now),
            Inbound::Ignored { .. } => return next,
        }
        next.applied += 1;
        if let Some(meta) = inbound.meta() {
            next.last_sequence = Some(meta.sequence);
        }
        next
    }

    fn device_joined(&mut self, meta: &EnvelopeMeta, device: &Device, now: DateTime<Utc>) {
        if self.device(&device.id).is_none() {
            self.devices.insert(
                0,
                Device {
                    status: DeviceStatus::Active,
                    last_seen: Some(now),
                    ..device.clone()
                },
            );
        } else {
            tracing::debug!(device_id = %device.id, "join for known device, registry unchanged");
        }
        self.push_event(map_join_event(meta, device));
    }

    fn device_left(&mut self, meta: &EnvelopeMeta, device: &Device, now: DateTime<Utc>) {
        if let Some(known) = self.devices.iter_mut().find(|d| d.id == device.id) {
            known.status = DeviceStatus::Idle;
            known.last_seen = Some(now);
        } else {
            tracing::debug!(device_id = %device.id, "leave for unknown device, registry unchanged");
        }
        self.push_event(map_join_event(meta, device));
    }

    fn periodic_metric(&mut self, meta: &EnvelopeMeta, sample: &MetricsSample, now: DateTime<Utc>) {
        self.metrics = sample.snapshot;

        // Positional: the first `active_devices` registry entries count as
        // active. The feed does not say which devices are active.
        let active = sample.snapshot.active_devices;
        for (rank, device) in (0_u64..).zip(self.devices.iter_mut()) {
            device.status = DeviceStatus::from(rank < active);
            device.last_seen = Some(sample.measured_at);
        }

        self.arp_rate = self
            .rate
            .observe(sample.snapshot.arp_requests, sample.measured_at, now);
        self.push_arp_point(ArpHistoryPoint {
            measured_at: sample.measured_at,
            arp_requests: sample.snapshot.arp_requests,
        });

        self.push_event(map_metric_event(meta, sample));
    }

    fn push_event(&mut self, event: DomainEvent) {
        self.events.insert(0, event);
        let cap = self.config.event_log_capacity;
        if cap > 0 && self.events.len() > cap {
            self.events.truncate(cap);
        }
    }

    fn push_arp_point(&mut self, point: ArpHistoryPoint) {
        let cap = self.config.arp_history_capacity;
        if cap == 0 {
            return;
        }
        self.arp_history.push_back(point);
        while self.arp_history.len() > cap {
            self.arp_history.pop_front();
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn events(&self) -> &[DomainEvent] {
        &self.events
    }

    pub fn events_page(&self, page: usize, page_size: usize) -> Page<DomainEvent> {
        paginate(&self.events, page, page_size)
    }

    pub fn metrics(&self) -> &MetricsSnapshot {
        &self.metrics
    }

    pub fn active_devices(&self) -> u64 {
        self.metrics.active_devices
    }

    pub fn idle_devices(&self) -> u64 {
        self.metrics.idle_devices()
    }

    /// ARP requests per minute from the latest sample.
    pub fn arp_rate(&self) -> u64 {
        self.arp_rate
    }

    pub fn rate_estimator(&self) -> &RateEstimator {
        &self.rate
    }

    pub fn arp_history(&self) -> &VecDeque<ArpHistoryPoint> {
        &self.arp_history
    }

    /// Messages applied so far. Ignored and rejected frames do not count.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

// ── Tests ──────────────────────────────────────────────────────────
