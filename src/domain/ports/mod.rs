//! Driven ports implemented by outbound adapters.
//!
//! Handlers hold these as `Arc<dyn ...>` so HTTP tests can substitute test
//! doubles without wiring real infrastructure.

mod snapshot_store;
mod telemetry_store;

pub use snapshot_store::{SnapshotStore, SnapshotTag};
pub use telemetry_store::TelemetryStore;
