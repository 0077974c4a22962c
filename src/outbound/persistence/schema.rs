//! Diesel table definition for the SQLite schema.
//!
//! Must match the embedded migrations exactly; Diesel uses it for
//! compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Telemetry entries: one row per ingested reading.
    telemetry_entries (id) {
        /// Primary key; `INTEGER PRIMARY KEY AUTOINCREMENT` keeps ids
        /// strictly increasing and never reused.
        id -> BigInt,
        /// Caller-supplied network address, matched case-insensitively.
        address -> Text,
        /// Opaque caller payload, stored as serialized JSON.
        payload -> Text,
        /// Server-assigned creation time (UTC).
        recorded_at -> Timestamp,
    }
}
