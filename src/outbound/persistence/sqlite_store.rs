//! SQLite-backed [`TelemetryStore`] implementation using Diesel.
//!
//! Queries are synchronous, so every operation clones the pool handle and
//! runs on `spawn_blocking` to keep the actix workers free.

use async_trait::async_trait;
use chrono::Utc;
use diesel::SqliteConnection;
use diesel::prelude::*;
use serde_json::{Map, Value};
use tracing::debug;

use super::models::{NewTelemetryRow, TelemetryRow};
use super::pool::{DbPool, PoolError};
use super::schema::telemetry_entries::dsl;
use crate::domain::ports::TelemetryStore;
use crate::domain::{Error, TelemetryRecord};

diesel::define_sql_function! {
    /// SQLite `lower`, used for case-insensitive address filtering.
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Diesel/SQLite implementation of the telemetry store port.
#[derive(Clone)]
pub struct SqliteTelemetryStore {
    pool: DbPool,
}

impl SqliteTelemetryStore {
    /// Create a new store backed by the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run a closure against a pooled connection on a blocking thread.
    async fn run<T, F>(&self, op: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, Error> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(map_pool_error)?;
            op(&mut conn)
        })
        .await
        .map_err(|err| Error::storage(format!("storage worker failed: {err}")))?
    }
}

fn map_pool_error(error: PoolError) -> Error {
    Error::storage(error.to_string())
}

/// Log the detailed failure, hand back a generic storage fault.
fn map_diesel_error(error: diesel::result::Error) -> Error {
    debug!(%error, "diesel operation failed");
    Error::storage("database error")
}

fn decode_row(row: TelemetryRow) -> Result<TelemetryRecord, Error> {
    row.into_record()
        .map_err(|err| Error::storage(format!("stored payload is not a JSON object: {err}")))
}

#[async_trait]
impl TelemetryStore for SqliteTelemetryStore {
    async fn insert(&self, address: String, payload: Map<String, Value>) -> Result<i64, Error> {
        let payload = Value::Object(payload).to_string();
        self.run(move |conn| {
            let row = NewTelemetryRow {
                address,
                payload,
                recorded_at: Utc::now().naive_utc(),
            };
            diesel::insert_into(dsl::telemetry_entries)
                .values(&row)
                .returning(dsl::id)
                .get_result::<i64>(conn)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn query(&self, address: Option<&str>) -> Result<Vec<TelemetryRecord>, Error> {
        let filter = address.map(str::to_lowercase);
        self.run(move |conn| {
            let mut query = dsl::telemetry_entries
                .select(TelemetryRow::as_select())
                .order(dsl::id.asc())
                .into_boxed();
            if let Some(filter) = filter {
                query = query.filter(lower(dsl::address).eq(filter));
            }
            let rows = query.load::<TelemetryRow>(conn).map_err(map_diesel_error)?;
            rows.into_iter().map(decode_row).collect()
        })
        .await
    }

    async fn latest(&self) -> Result<Option<TelemetryRecord>, Error> {
        self.run(|conn| {
            let row = dsl::telemetry_entries
                .select(TelemetryRow::as_select())
                .order(dsl::id.desc())
                .first::<TelemetryRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            row.map(decode_row).transpose()
        })
        .await
    }

    async fn find(&self, id: i64) -> Result<Option<TelemetryRecord>, Error> {
        self.run(move |conn| {
            let row = dsl::telemetry_entries
                .select(TelemetryRow::as_select())
                .filter(dsl::id.eq(id))
                .first::<TelemetryRow>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            row.map(decode_row).transpose()
        })
        .await
    }

    async fn delete_all(&self) -> Result<u64, Error> {
        self.run(|conn| {
            diesel::delete(dsl::telemetry_entries)
                .execute(conn)
                .map(|deleted| deleted as u64)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn count(&self) -> Result<u64, Error> {
        self.run(|conn| {
            dsl::telemetry_entries
                .count()
                .get_result::<i64>(conn)
                // count(*) is never negative.
                .map(|n| u64::try_from(n).unwrap_or_default())
                .map_err(map_diesel_error)
        })
        .await
    }
}
