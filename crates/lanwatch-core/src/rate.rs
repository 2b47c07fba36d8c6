// ── ARP request rate ──
//
// Turns the cumulative ARP request counter of each metric sample into a
// requests-per-minute figure for the dashboard card.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// The previous observation the estimator compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSample {
    pub arp_requests: u64,
    pub sampled_at: DateTime<Utc>,
}

/// Stateful ARP rate estimator.
///
/// The first observation only primes the estimator and reports 0. Every
/// observation replaces the stored sample, whatever rate it produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEstimator {
    previous: Option<RateSample>,
}

impl RateEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<RateSample> {
        self.previous
    }

    /// Record a sample and return the current rate in requests per minute.
    ///
    /// The rate divides the sample's ARP request count by the minutes between
    /// `measured_at` and `now` (the ingestion time). A non-positive interval
    /// yields 0.
    pub fn observe(
        &mut self,
        arp_requests: u64,
        measured_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> u64 {
        let primed = self.previous.is_some();
        self.previous = Some(RateSample {
            arp_requests,
            sampled_at: measured_at,
        });

        if primed {
            requests_per_minute(arp_requests, now - measured_at)
        } else {
            0
        }
    }
}

/// `round(requests / minutes)`, or 0 when `elapsed` is not positive.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
pub fn requests_per_minute(requests: u64, elapsed: TimeDelta) -> u64 {
    let Some(micros) = elapsed.num_microseconds().filter(|m| *m > 0) else {
        return 0;
    };
    let minutes = micros as f64 / 60_000_000.0;
    (requests as f64 / minutes).round() as u64
}
