//! Row types mapping `telemetry_entries` to the domain record.

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde_json::{Map, Value};

use super::schema::telemetry_entries;
use crate::domain::TelemetryRecord;

/// A stored row as read back from the table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = telemetry_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TelemetryRow {
    pub id: i64,
    pub address: String,
    pub payload: String,
    pub recorded_at: NaiveDateTime,
}

/// Insertable row; the id is assigned by SQLite.
#[derive(Debug, Insertable)]
#[diesel(table_name = telemetry_entries)]
pub struct NewTelemetryRow {
    pub address: String,
    pub payload: String,
    pub recorded_at: NaiveDateTime,
}

impl TelemetryRow {
    /// Decode the stored payload text and lift the row into the domain
    /// record. Fails only if the stored text is not a JSON object, which
    /// the insert path never writes.
    pub fn into_record(self) -> Result<TelemetryRecord, serde_json::Error> {
        let payload: Map<String, Value> = serde_json::from_str(&self.payload)?;
        Ok(TelemetryRecord {
            id: self.id,
            address: self.address,
            recorded_at: DateTime::<Utc>::from_naive_utc_and_offset(self.recorded_at, Utc),
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn row_decodes_into_domain_record() {
        let row = TelemetryRow {
            id: 3,
            address: "AA:BB".into(),
            payload: r#"{"temp":21.5}"#.into(),
            recorded_at: NaiveDateTime::parse_from_str("2025-11-02 10:00:00", "%Y-%m-%d %H:%M:%S")
                .expect("fixture timestamp"),
        };

        let record = row.into_record().expect("valid payload");
        assert_eq!(record.id, 3);
        assert_eq!(record.address, "AA:BB");
        assert_eq!(record.payload["temp"], json!(21.5));
        assert_eq!(record.recorded_at.to_rfc3339(), "2025-11-02T10:00:00+00:00");
    }

    #[rstest]
    fn non_object_payload_is_rejected() {
        let row = TelemetryRow {
            id: 1,
            address: String::new(),
            payload: "[1,2,3]".into(),
            recorded_at: NaiveDateTime::default(),
        };

        assert!(row.into_record().is_err());
    }
}
