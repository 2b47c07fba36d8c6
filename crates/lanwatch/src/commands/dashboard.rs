//! Dashboard rendering shared by `watch` and `replay`.

use std::collections::VecDeque;
use std::fmt::Write;

use serde::Serialize;
use tabled::Tabled;

use lanwatch_core::{
    ArpHistoryPoint, ConnectionState, DashboardState, Device, DomainEvent, IngestReport,
    MetricsSnapshot, Page,
};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            name: d.name.clone(),
            ip: d.ip.clone(),
            mac: d.mac.clone(),
            vendor: d.vendor.clone(),
            device_type: d.device_type.clone(),
            status: d.status.to_string(),
            last_seen: d.last_seen_display(),
        }
    }
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Seq")]
    id: String,
}

impl From<&DomainEvent> for EventRow {
    fn from(e: &DomainEvent) -> Self {
        Self {
            time: e.display_time(),
            kind: e.kind.to_string(),
            message: e.message.clone(),
            id: e.id.clone(),
        }
    }
}

// ── Report ──────────────────────────────────────────────────────────

/// Everything printed at the end of `watch` or `replay`.
#[derive(Serialize)]
pub struct DashboardReport<'a> {
    pub profile: &'a str,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingest: Option<IngestReport>,
    pub metrics: &'a MetricsSnapshot,
    pub idle_devices: u64,
    pub broadcast_share: Option<f64>,
    pub arp_rate: u64,
    pub arp_history: &'a VecDeque<ArpHistoryPoint>,
    pub devices: &'a [Device],
    pub events: Page<DomainEvent>,
}

impl<'a> DashboardReport<'a> {
    pub fn new(
        state: &'a DashboardState,
        profile: &'a str,
        source: String,
        ingest: Option<IngestReport>,
        page: usize,
        page_size: usize,
    ) -> Self {
        Self {
            profile,
            source,
            ingest,
            metrics: state.metrics(),
            idle_devices: state.idle_devices(),
            broadcast_share: state.metrics().broadcast_share(),
            arp_rate: state.arp_rate(),
            arp_history: state.arp_history(),
            devices: state.devices(),
            events: state.events_page(page, page_size),
        }
    }
}

pub fn render(
    format: OutputFormat,
    report: &DashboardReport<'_>,
    color: bool,
) -> Result<String, CliError> {
    output::render_single(format, report, |r| Ok(detail(r, color)))
}

fn detail(r: &DashboardReport<'_>, color: bool) -> String {
    let mut out = String::new();
    let m = r.metrics;

    let _ = writeln!(
        out,
        "{}",
        output::heading(&format!("Devices ({})", r.devices.len()), color)
    );
    let rows: Vec<DeviceRow> = r.devices.iter().map(DeviceRow::from).collect();
    let _ = writeln!(out, "{}", output::render_table(&rows));

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", output::heading("Metrics", color));
    let _ = writeln!(
        out,
        "  Devices:  {} total, {} active, {} idle",
        m.total_devices, m.active_devices, r.idle_devices
    );
    let _ = writeln!(
        out,
        "  Data:     {} B sent, {} B received",
        m.data_sent, m.data_received
    );
    let share = r
        .broadcast_share
        .map_or_else(|| "—".to_owned(), |s| format!("{:.1}% broadcast", s * 100.0));
    let _ = writeln!(
        out,
        "  Packets:  {} broadcast, {} unicast ({share})",
        m.broadcast_packets, m.unicast_packets
    );
    let _ = writeln!(
        out,
        "  ARP:      {} requests, {} replies, {}/min",
        m.arp_requests, m.arp_replies, r.arp_rate
    );

    let page = &r.events;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{}",
        output::heading(
            &format!(
                "Events (page {}/{}, {} total)",
                page.number, page.total_pages, page.total_items
            ),
            color
        )
    );
    let rows: Vec<EventRow> = page.items.iter().map(EventRow::from).collect();
    let _ = write!(out, "{}", output::render_table(&rows));

    if let Some(ingest) = r.ingest {
        let _ = write!(
            out,
            "\n\n{}: {} applied, {} ignored, {} rejected",
            r.source, ingest.applied, ingest.ignored, ingest.rejected
        );
    }
    out
}

/// One-line status used while following a live feed.
pub fn summary_line(state: &DashboardState, connection: ConnectionState, color: bool) -> String {
    let m = state.metrics();
    let newest = state
        .events()
        .first()
        .map_or_else(String::new, |e| format!("  | {}", e.message));
    format!(
        "{} {:<10}  devices {} ({} active, {} idle)  arp {}/min  events {}{newest}",
        chrono::Local::now().format("%H:%M:%S"),
        output::connection_label(connection, color),
        state.devices().len(),
        m.active_devices,
        state.idle_devices(),
        state.arp_rate(),
        state.events().len(),
    )
}
