//! Driven port for the telemetry record store.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::{Error, TelemetryRecord};

/// Persistence port for telemetry records.
///
/// Every mutating operation must be durable before it returns, and
/// adapters must not cache records across calls: a sequential caller
/// always reads its own writes.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Persist a new record, returning the assigned id.
    ///
    /// The id is assigned atomically by the store; callers never supply it.
    async fn insert(&self, address: String, payload: Map<String, Value>) -> Result<i64, Error>;

    /// Fetch records in ascending id order, optionally narrowed to a
    /// case-insensitive address match.
    async fn query(&self, address: Option<&str>) -> Result<Vec<TelemetryRecord>, Error>;

    /// Fetch the record with the highest id, if any.
    async fn latest(&self) -> Result<Option<TelemetryRecord>, Error>;

    /// Fetch a single record by id.
    async fn find(&self, id: i64) -> Result<Option<TelemetryRecord>, Error>;

    /// Remove every record atomically, returning how many were deleted.
    ///
    /// The store takes no safety copy of its own; callers wanting one must
    /// snapshot through [`super::SnapshotStore`] first.
    async fn delete_all(&self) -> Result<u64, Error>;

    /// Total records currently stored.
    async fn count(&self) -> Result<u64, Error>;
}
