// ── Reactive state storage ──

mod state_store;

pub use state_store::{IngestOutcome, StateStore};
