// ── Device registry entries ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown for an absent address or timestamp.
pub const PLACEHOLDER: &str = "—";

/// Shown for an absent name, vendor, or device type.
pub const UNKNOWN: &str = "Unknown";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    Idle,
}

impl From<bool> for DeviceStatus {
    fn from(active: bool) -> Self {
        if active { Self::Active } else { Self::Idle }
    }
}

/// A device observed on the monitored network.
///
/// `id` is the registry key; the registry never holds two devices with the
/// same id. Devices are never removed, only marked idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub mac: String,
    pub vendor: String,
    pub device_type: String,
    pub status: DeviceStatus,
    pub last_seen: Option<DateTime<Utc>>,
}

impl Device {
    pub fn is_active(&self) -> bool {
        self.status == DeviceStatus::Active
    }

    /// Local clock time of `last_seen`, or the placeholder when unknown.
    pub fn last_seen_display(&self) -> String {
        self.last_seen
            .map_or_else(|| PLACEHOLDER.to_owned(), super::clock_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(id: &str) -> Device {
        Device {
            id: id.into(),
            name: UNKNOWN.into(),
            ip: PLACEHOLDER.into(),
            mac: PLACEHOLDER.into(),
            vendor: UNKNOWN.into(),
            device_type: UNKNOWN.into(),
            status: DeviceStatus::Idle,
            last_seen: None,
        }
    }

    #[test]
    fn status_from_flag() {
        assert_eq!(DeviceStatus::from(true), DeviceStatus::Active);
        assert_eq!(DeviceStatus::from(false), DeviceStatus::Idle);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DeviceStatus::Active).ok().as_deref(),
            Some("\"active\"")
        );
        assert_eq!(DeviceStatus::Idle.to_string(), "idle");
        assert_eq!("active".parse::<DeviceStatus>().ok(), Some(DeviceStatus::Active));
    }

    #[test]
    fn missing_last_seen_shows_placeholder() {
        assert_eq!(bare("d-1").last_seen_display(), "—");
    }

    #[test]
    fn known_last_seen_is_clock_time() {
        let mut device = bare("d-1");
        device.last_seen = Some(Utc::now());
        let shown = device.last_seen_display();
        assert_eq!(shown.len(), 8);
        assert_eq!(shown.matches(':').count(), 2);
    }
}
