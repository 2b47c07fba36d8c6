// ── Ingest loop ──
//
// Pulls text frames from any stream (a live feed queue or a recorded
// file) and applies them to a `StateStore` strictly in arrival order.

use chrono::Utc;
use futures_core::Stream;
use futures_util::StreamExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::store::{IngestOutcome, StateStore};

/// Per-outcome frame counts for one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub applied: u64,
    pub ignored: u64,
    pub rejected: u64,
}

impl IngestReport {
    pub fn record(&mut self, outcome: IngestOutcome) {
        match outcome {
            IngestOutcome::Applied => self.applied += 1,
            IngestOutcome::Ignored => self.ignored += 1,
            IngestOutcome::Rejected => self.rejected += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.applied + self.ignored + self.rejected
    }
}

/// Apply every frame until the stream ends or `cancel` fires.
///
/// Ingestion time for each frame is read from the system clock.
pub async fn run_ingest<S>(store: &StateStore, frames: S, cancel: &CancellationToken) -> IngestReport
where
    S: Stream<Item = String>,
{
    futures_util::pin_mut!(frames);
    let mut report = IngestReport::default();

    loop {
        let frame = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("ingest cancelled");
                break;
            }
            frame = frames.next() => frame,
        };
        let Some(text) = frame else {
            break;
        };
        report.record(store.ingest(&text, Utc::now()));
    }

    tracing::debug!(
        applied = report.applied,
        ignored = report.ignored,
        rejected = report.rejected,
        "ingest finished"
    );
    report
}
