// ── Raw wire types ──
//
// Serde shapes of the JSON envelope the telemetry feed sends. These are
// deliberately loose: the envelope keeps `meta` and `payload` as raw JSON so
// that unknown message kinds can be skipped without validating their bodies.
// `lanwatch-core` turns them into domain types.

use serde::{Deserialize, Serialize};

/// One inbound text frame, parsed but not yet validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireMessage {
    /// Message family, e.g. `"TOPOLOGY"` or `"METRIC"`.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Message kind within the family, e.g. `"DEVICE_JOINED"`.
    #[serde(default)]
    pub subtype: String,

    #[serde(default)]
    pub meta: Option<serde_json::Value>,

    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

/// Envelope metadata. Required for every message kind the engine applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMeta {
    /// Monotonic sequence number assigned by the feed.
    pub sequence: u64,
    /// ISO-8601 emission time.
    pub timestamp: String,
}

/// Device record carried by topology messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDevice {
    pub device_id: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub last_seen: Option<String>,
}

/// Counter block carried by periodic metric messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMetrics {
    pub total_devices: u64,
    pub active_devices: u64,
    pub data_sent: u64,
    pub data_received: u64,
    pub total_broadcast_packets: u64,
    pub total_unicast_packets: u64,
    pub arp_requests: u64,
    pub arp_replies: u64,
    #[serde(default)]
    pub measure_time: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn envelope_keeps_unknown_bodies_raw() {
        let raw = r#"{
            "type": "ALERT",
            "subtype": "SOMETHING_NEW",
            "meta": { "whatever": true },
            "payload": [1, 2, 3]
        }"#;

        let msg: WireMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.kind, "ALERT");
        assert_eq!(msg.subtype, "SOMETHING_NEW");
        assert!(msg.payload.unwrap().is_array());
    }

    #[test]
    fn envelope_tolerates_missing_fields() {
        let msg: WireMessage = serde_json::from_str("{}").unwrap();
        assert!(msg.kind.is_empty());
        assert!(msg.meta.is_none());
        assert!(msg.payload.is_none());
    }

    #[test]
    fn device_optional_fields_default_to_none() {
        let device: WireDevice =
            serde_json::from_value(serde_json::json!({ "device_id": "d-1" })).unwrap();
        assert_eq!(device.device_id, "d-1");
        assert!(device.hostname.is_none());
        assert!(device.is_active.is_none());
    }

    #[test]
    fn device_requires_id() {
        let result =
            serde_json::from_value::<WireDevice>(serde_json::json!({ "hostname": "nas" }));
        assert!(result.is_err());
    }

    #[test]
    fn metrics_reject_negative_counters() {
        let result = serde_json::from_value::<WireMetrics>(serde_json::json!({
            "total_devices": -1,
            "active_devices": 0,
            "data_sent": 0,
            "data_received": 0,
            "total_broadcast_packets": 0,
            "total_unicast_packets": 0,
            "arp_requests": 0,
            "arp_replies": 0
        }));
        assert!(result.is_err());
    }
}
