//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without real I/O.

use std::sync::Arc;

use crate::domain::ports::{SnapshotStore, TelemetryStore};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Record persistence port.
    pub store: Arc<dyn TelemetryStore>,
    /// Pre-destruction snapshot port.
    pub snapshots: Arc<dyn SnapshotStore>,
}

impl HttpState {
    /// Bundle the two ports the handlers need.
    pub fn new(store: Arc<dyn TelemetryStore>, snapshots: Arc<dyn SnapshotStore>) -> Self {
        Self { store, snapshots }
    }
}
