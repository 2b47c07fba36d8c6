// ── Wire-to-domain conversions ──
//
// Turns one raw text frame into an `Inbound` message the engine can apply.
// Missing optional device fields get display defaults and never fail a
// frame; only the identity fields (`meta.sequence`, `meta.timestamp`,
// `device_id`) and the metric counters are required.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use lanwatch_api::wire::{WireDevice, WireMessage, WireMeta, WireMetrics};

use crate::error::DecodeError;
use crate::model::{
    Device, DeviceStatus, DomainEvent, EnvelopeMeta, EventKind, MetricsSample, MetricsSnapshot,
    PLACEHOLDER, UNKNOWN,
};

// ── Inbound messages ───────────────────────────────────────────────

/// A validated feed message, ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    DeviceJoined { meta: EnvelopeMeta, device: Device },
    DeviceLeft { meta: EnvelopeMeta, device: Device },
    PeriodicMetric { meta: EnvelopeMeta, sample: MetricsSample },
    /// A `(type, subtype)` pair this engine does not handle.
    Ignored { kind: String, subtype: String },
}

impl Inbound {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored { .. })
    }

    pub fn meta(&self) -> Option<&EnvelopeMeta> {
        match self {
            Self::DeviceJoined { meta, .. }
            | Self::DeviceLeft { meta, .. }
            | Self::PeriodicMetric { meta, .. } => Some(meta),
            Self::Ignored { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageKind {
    DeviceJoined,
    DeviceLeft,
    PeriodicMetric,
}

fn classify(kind: &str, subtype: &str) -> Option<MessageKind> {
    match (kind, subtype) {
        ("TOPOLOGY", "DEVICE_JOINED") => Some(MessageKind::DeviceJoined),
        ("TOPOLOGY", "DEVICE_LEFT") => Some(MessageKind::DeviceLeft),
        ("METRIC", "PERIODIC_METRIC_STATE") => Some(MessageKind::PeriodicMetric),
        _ => None,
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an ISO-8601 / RFC 3339 timestamp.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn text_or(raw: Option<&String>, fallback: &str) -> String {
    raw.map_or_else(|| fallback.to_owned(), Clone::clone)
}

/// Deserialize `payload.<key>` into `T`, treating `null` as absent.
fn payload_field<'a, T: Deserialize<'a>>(
    payload: Option<&'a Value>,
    key: &str,
    field: &'static str,
) -> Result<T, DecodeError> {
    let value = payload
        .and_then(|p| p.get(key))
        .filter(|v| !v.is_null())
        .ok_or(DecodeError::MissingField(field))?;
    T::deserialize(value).map_err(|source| DecodeError::Malformed { field, source })
}

fn decode_meta(raw: Option<&Value>) -> Result<EnvelopeMeta, DecodeError> {
    let raw = raw
        .filter(|v| !v.is_null())
        .ok_or(DecodeError::MissingField("meta"))?;

    if raw.get("sequence").is_none_or(Value::is_null) {
        return Err(DecodeError::MissingField("meta.sequence"));
    }
    if raw.get("timestamp").is_none_or(Value::is_null) {
        return Err(DecodeError::MissingField("meta.timestamp"));
    }

    let meta = WireMeta::deserialize(raw).map_err(|source| DecodeError::Malformed {
        field: "meta",
        source,
    })?;
    let timestamp =
        parse_datetime(&meta.timestamp).ok_or_else(|| DecodeError::InvalidTimestamp {
            field: "meta.timestamp",
            value: meta.timestamp.clone(),
        })?;

    Ok(EnvelopeMeta {
        sequence: meta.sequence,
        timestamp,
    })
}

fn decode_device(payload: Option<&Value>) -> Result<Device, DecodeError> {
    let raw: WireDevice = payload_field(payload, "device", "payload.device")?;
    if raw.device_id.is_empty() {
        return Err(DecodeError::MissingField("payload.device.device_id"));
    }
    Ok(Device::from(&raw))
}

fn decode_metrics(
    payload: Option<&Value>,
    meta: &EnvelopeMeta,
) -> Result<MetricsSample, DecodeError> {
    let raw: WireMetrics = payload_field(payload, "metrics", "payload.metrics")?;
    if raw.active_devices > raw.total_devices {
        return Err(DecodeError::InconsistentMetrics {
            active: raw.active_devices,
            total: raw.total_devices,
        });
    }

    let measured_at = match raw.measure_time.as_deref() {
        Some(text) => parse_datetime(text).unwrap_or_else(|| {
            tracing::debug!(
                measure_time = text,
                sequence = meta.sequence,
                "unparseable measure_time, using envelope timestamp"
            );
            meta.timestamp
        }),
        None => meta.timestamp,
    };

    Ok(MetricsSample {
        snapshot: MetricsSnapshot::from(&raw),
        measured_at,
    })
}

// ── Decoding ───────────────────────────────────────────────────────

/// Decode one UTF-8 JSON text frame.
pub fn decode(text: &str) -> Result<Inbound, DecodeError> {
    let message: WireMessage = serde_json::from_str(text)?;
    decode_message(message)
}

/// Validate an already-parsed envelope.
///
/// Unknown `(type, subtype)` pairs become [`Inbound::Ignored`] without
/// looking at `meta` or `payload`.
pub fn decode_message(message: WireMessage) -> Result<Inbound, DecodeError> {
    let Some(kind) = classify(&message.kind, &message.subtype) else {
        return Ok(Inbound::Ignored {
            kind: message.kind,
            subtype: message.subtype,
        });
    };

    let meta = decode_meta(message.meta.as_ref())?;
    let payload = message.payload.as_ref();

    Ok(match kind {
        MessageKind::DeviceJoined => Inbound::DeviceJoined {
            meta,
            device: decode_device(payload)?,
        },
        MessageKind::DeviceLeft => Inbound::DeviceLeft {
            meta,
            device: decode_device(payload)?,
        },
        MessageKind::PeriodicMetric => Inbound::PeriodicMetric {
            sample: decode_metrics(payload, &meta)?,
            meta,
        },
    })
}

// ── Device ─────────────────────────────────────────────────────────

impl From<&WireDevice> for Device {
    fn from(d: &WireDevice) -> Self {
        Device {
            id: d.device_id.clone(),
            name: text_or(d.hostname.as_ref(), UNKNOWN),
            ip: text_or(d.ip_address.as_ref(), PLACEHOLDER),
            mac: text_or(d.mac_address.as_ref(), PLACEHOLDER),
            vendor: text_or(d.vendor.as_ref(), UNKNOWN),
            device_type: text_or(d.device_type.as_ref(), UNKNOWN),
            status: DeviceStatus::from(d.is_active.unwrap_or(false)),
            // Absent stays absent; it is not "now".
            last_seen: d.last_seen.as_deref().and_then(parse_datetime),
        }
    }
}

// ── Metrics ────────────────────────────────────────────────────────

impl From<&WireMetrics> for MetricsSnapshot {
    fn from(m: &WireMetrics) -> Self {
        MetricsSnapshot {
            total_devices: m.total_devices,
            active_devices: m.active_devices,
            data_sent: m.data_sent,
            data_received: m.data_received,
            broadcast_packets: m.total_broadcast_packets,
            unicast_packets: m.total_unicast_packets,
            arp_requests: m.arp_requests,
            arp_replies: m.arp_replies,
        }
    }
}

// ── Events ─────────────────────────────────────────────────────────

/// Log entry for a topology notification. Leave notifications go through
/// here too, so they are logged as `join` with the connect wording.
pub fn map_join_event(meta: &EnvelopeMeta, device: &Device) -> DomainEvent {
    DomainEvent {
        id: meta.sequence.to_string(),
        kind: EventKind::Join,
        message: format!("New device connected – {}", device.ip),
        timestamp: meta.timestamp,
        payload: None,
    }
}

pub fn map_metric_event(meta: &EnvelopeMeta, sample: &MetricsSample) -> DomainEvent {
    DomainEvent {
        id: meta.sequence.to_string(),
        kind: EventKind::Metric,
        message: format!(
            "Metrics update: {} devices, {} active",
            sample.snapshot.total_devices, sample.snapshot.active_devices
        ),
        timestamp: meta.timestamp,
        payload: Some(*sample),
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(value: &Value) -> String {
        value.to_string()
    }

    fn join_frame(device: &Value) -> String {
        frame(&json!({
            "type": "TOPOLOGY",
            "subtype": "DEVICE_JOINED",
            "meta": { "sequence": 42, "timestamp": "2026-02-10T12:00:00Z" },
            "payload": { "device": device }
        }))
    }

    fn metrics_body() -> Value {
        json!({
            "total_devices": 5,
            "active_devices": 2,
            "data_sent": 1000,
            "data_received": 2000,
            "total_broadcast_packets": 30,
            "total_unicast_packets": 70,
            "arp_requests": 120,
            "arp_replies": 110
        })
    }

    #[test]
    fn device_defaults_for_missing_fields() {
        let inbound = decode(&join_frame(&json!({ "device_id": "d-1" }))).unwrap();
        let Inbound::DeviceJoined { device, .. } = inbound else {
            panic!("expected a join");
        };

        assert_eq!(device.id, "d-1");
        assert_eq!(device.name, "Unknown");
        assert_eq!(device.ip, "—");
        assert_eq!(device.mac, "—");
        assert_eq!(device.vendor, "Unknown");
        assert_eq!(device.device_type, "Unknown");
        assert_eq!(device.status, DeviceStatus::Idle);
        assert_eq!(device.last_seen, None);
    }

    #[test]
    fn device_fields_map_through() {
        let raw = WireDevice {
            device_id: "d-2".into(),
            hostname: Some("printer".into()),
            ip_address: Some("10.0.0.9".into()),
            mac_address: Some("aa:bb:cc:dd:ee:ff".into()),
            vendor: Some("Brother".into()),
            device_type: Some("printer".into()),
            is_active: Some(true),
            last_seen: Some("2026-02-10T12:00:00+02:00".into()),
        };

        let device = Device::from(&raw);
        assert_eq!(device.name, "printer");
        assert_eq!(device.ip, "10.0.0.9");
        assert_eq!(device.status, DeviceStatus::Active);
        assert_eq!(
            device.last_seen,
            Some("2026-02-10T10:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
    }

    #[test]
    fn unparseable_last_seen_is_absent() {
        let raw = WireDevice {
            device_id: "d-3".into(),
            last_seen: Some("yesterday".into()),
            ..WireDevice::default()
        };
        assert_eq!(Device::from(&raw).last_seen, None);
    }

    #[test]
    fn join_event_embeds_ip_and_sequence() {
        let inbound =
            decode(&join_frame(&json!({ "device_id": "d-1", "ip_address": "10.0.0.5" }))).unwrap();
        let Inbound::DeviceJoined { meta, device } = inbound else {
            panic!("expected a join");
        };

        let event = map_join_event(&meta, &device);
        assert_eq!(event.id, "42");
        assert_eq!(event.kind, EventKind::Join);
        assert_eq!(event.message, "New device connected – 10.0.0.5");
        assert_eq!(event.timestamp, meta.timestamp);
        assert!(event.payload.is_none());
    }

    #[test]
    fn metric_event_summarizes_counts() {
        let meta = EnvelopeMeta {
            sequence: 7,
            timestamp: Utc::now(),
        };
        let sample = MetricsSample {
            snapshot: MetricsSnapshot {
                total_devices: 9,
                active_devices: 4,
                ..MetricsSnapshot::default()
            },
            measured_at: meta.timestamp,
        };

        let event = map_metric_event(&meta, &sample);
        assert_eq!(event.message, "Metrics update: 9 devices, 4 active");
        assert_eq!(event.kind, EventKind::Metric);
        assert_eq!(event.payload, Some(sample));
    }

    #[test]
    fn non_json_is_a_json_error() {
        assert!(matches!(decode("not json at all"), Err(DecodeError::Json(_))));
        assert!(matches!(decode("42"), Err(DecodeError::Json(_))));
    }

    #[test]
    fn unknown_kinds_are_ignored_without_validation() {
        let inbound = decode(&frame(&json!({
            "type": "ALERT",
            "subtype": "DEVICE_JOINED",
            "meta": "not an object"
        })))
        .unwrap();

        assert_eq!(
            inbound,
            Inbound::Ignored {
                kind: "ALERT".into(),
                subtype: "DEVICE_JOINED".into()
            }
        );
        assert!(inbound.meta().is_none());
    }

    #[test]
    fn missing_identity_fields_are_rejected() {
        let no_meta = frame(&json!({
            "type": "TOPOLOGY",
            "subtype": "DEVICE_LEFT",
            "payload": { "device": { "device_id": "d-1" } }
        }));
        assert!(matches!(decode(&no_meta), Err(DecodeError::MissingField("meta"))));

        let no_sequence = frame(&json!({
            "type": "TOPOLOGY",
            "subtype": "DEVICE_LEFT",
            "meta": { "timestamp": "2026-02-10T12:00:00Z" },
            "payload": { "device": { "device_id": "d-1" } }
        }));
        assert!(matches!(
            decode(&no_sequence),
            Err(DecodeError::MissingField("meta.sequence"))
        ));

        let no_timestamp = frame(&json!({
            "type": "TOPOLOGY",
            "subtype": "DEVICE_JOINED",
            "meta": { "sequence": 4 },
            "payload": { "device": { "device_id": "d-1" } }
        }));
        assert!(matches!(
            decode(&no_timestamp),
            Err(DecodeError::MissingField("meta.timestamp"))
        ));

        let no_device_id = join_frame(&json!({ "hostname": "nas" }));
        assert!(matches!(
            decode(&no_device_id),
            Err(DecodeError::Malformed { field: "payload.device", .. })
        ));

        let empty_device_id = join_frame(&json!({ "device_id": "" }));
        assert!(matches!(
            decode(&empty_device_id),
            Err(DecodeError::MissingField("payload.device.device_id"))
        ));
    }

    #[test]
    fn malformed_identity_fields_are_rejected() {
        let bad_sequence = frame(&json!({
            "type": "TOPOLOGY",
            "subtype": "DEVICE_JOINED",
            "meta": { "sequence": "seven", "timestamp": "2026-02-10T12:00:00Z" },
            "payload": { "device": { "device_id": "d-1" } }
        }));
        assert!(matches!(
            decode(&bad_sequence),
            Err(DecodeError::Malformed { field: "meta", .. })
        ));

        let bad_timestamp = frame(&json!({
            "type": "TOPOLOGY",
            "subtype": "DEVICE_JOINED",
            "meta": { "sequence": 1, "timestamp": "noon" },
            "payload": { "device": { "device_id": "d-1" } }
        }));
        assert!(matches!(
            decode(&bad_timestamp),
            Err(DecodeError::InvalidTimestamp { field: "meta.timestamp", .. })
        ));
    }

    #[test]
    fn metrics_use_measure_time_when_present() {
        let mut body = metrics_body();
        body["measure_time"] = json!("2026-02-10T11:59:00Z");
        let inbound = decode(&frame(&json!({
            "type": "METRIC",
            "subtype": "PERIODIC_METRIC_STATE",
            "meta": { "sequence": 3, "timestamp": "2026-02-10T12:00:00Z" },
            "payload": { "metrics": body }
        })))
        .unwrap();

        let Inbound::PeriodicMetric { sample, .. } = inbound else {
            panic!("expected a metric sample");
        };
        assert_eq!(
            sample.measured_at,
            "2026-02-10T11:59:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(sample.snapshot.broadcast_packets, 30);
        assert_eq!(sample.snapshot.unicast_packets, 70);
        assert_eq!(sample.snapshot.arp_requests, 120);
    }

    #[test]
    fn metrics_fall_back_to_envelope_timestamp() {
        let inbound = decode(&frame(&json!({
            "type": "METRIC",
            "subtype": "PERIODIC_METRIC_STATE",
            "meta": { "sequence": 3, "timestamp": "2026-02-10T12:00:00Z" },
            "payload": { "metrics": metrics_body() }
        })))
        .unwrap();

        let Inbound::PeriodicMetric { meta, sample } = inbound else {
            panic!("expected a metric sample");
        };
        assert_eq!(sample.measured_at, meta.timestamp);
    }

    #[test]
    fn metrics_with_more_active_than_total_are_rejected() {
        let mut body = metrics_body();
        body["active_devices"] = json!(6);
        let result = decode(&frame(&json!({
            "type": "METRIC",
            "subtype": "PERIODIC_METRIC_STATE",
            "meta": { "sequence": 3, "timestamp": "2026-02-10T12:00:00Z" },
            "payload": { "metrics": body }
        })));

        assert!(matches!(
            result,
            Err(DecodeError::InconsistentMetrics { active: 6, total: 5 })
        ));
    }

    #[test]
    fn missing_metrics_block_is_rejected() {
        let result = decode(&frame(&json!({
            "type": "METRIC",
            "subtype": "PERIODIC_METRIC_STATE",
            "meta": { "sequence": 3, "timestamp": "2026-02-10T12:00:00Z" },
            "payload": {}
        })));
        assert!(matches!(
            result,
            Err(DecodeError::MissingField("payload.metrics"))
        ));
    }
}
