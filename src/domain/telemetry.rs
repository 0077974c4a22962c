//! Telemetry record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single stored telemetry entry.
///
/// Serialization merges the caller-supplied payload fields into the same
/// object as the server-assigned metadata, which is the wire shape the
/// public query endpoint returns.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use telemetry_backend::domain::TelemetryRecord;
///
/// let record = TelemetryRecord {
///     id: 1,
///     address: "AA:BB:CC:DD:EE:FF".into(),
///     recorded_at: chrono::Utc::now(),
///     payload: json!({ "temp": 21.5 })
///         .as_object()
///         .cloned()
///         .expect("object"),
/// };
/// let wire = serde_json::to_value(&record).expect("serialize");
/// assert_eq!(wire["temp"], json!(21.5));
/// assert_eq!(wire["id"], json!(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TelemetryRecord {
    /// Server-assigned identifier: unique, strictly increasing, never reused.
    pub id: i64,
    /// Caller-supplied network address; not validated for format.
    pub address: String,
    /// Server-assigned creation time, immutable once written.
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
    /// Opaque caller payload, merged into the serialized object.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub payload: Map<String, Value>,
}

/// Admin export row: the payload stays nested under a `data` field instead
/// of being flattened into the metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ExportRecord {
    /// Server-assigned identifier.
    pub id: i64,
    /// Caller-supplied network address.
    pub address: String,
    /// Server-assigned creation time.
    pub timestamp: DateTime<Utc>,
    /// Parsed caller payload.
    #[schema(value_type = Object)]
    pub data: Value,
}

impl From<TelemetryRecord> for ExportRecord {
    fn from(record: TelemetryRecord) -> Self {
        Self {
            id: record.id,
            address: record.address,
            timestamp: record.recorded_at,
            data: Value::Object(record.payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn sample() -> TelemetryRecord {
        TelemetryRecord {
            id: 7,
            address: "aa:bb".into(),
            recorded_at: DateTime::parse_from_rfc3339("2025-11-02T10:00:00Z")
                .expect("fixture timestamp")
                .with_timezone(&Utc),
            payload: json!({ "temp": 21.5, "unit": "C" })
                .as_object()
                .cloned()
                .expect("object"),
        }
    }

    #[rstest]
    fn record_serializes_payload_fields_at_top_level() {
        let wire = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(wire["id"], json!(7));
        assert_eq!(wire["address"], json!("aa:bb"));
        assert_eq!(wire["timestamp"], json!("2025-11-02T10:00:00Z"));
        assert_eq!(wire["temp"], json!(21.5));
        assert_eq!(wire["unit"], json!("C"));
    }

    #[rstest]
    fn export_row_nests_payload_under_data() {
        let wire = serde_json::to_value(ExportRecord::from(sample())).expect("serialize");
        assert_eq!(wire["data"], json!({ "temp": 21.5, "unit": "C" }));
        assert!(wire.get("temp").is_none());
    }

    #[rstest]
    fn record_round_trips_through_json() {
        let record = sample();
        let wire = serde_json::to_string(&record).expect("serialize");
        let back: TelemetryRecord = serde_json::from_str(&wire).expect("deserialize");
        assert_eq!(back, record);
    }
}
