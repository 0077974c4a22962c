//! Transport-agnostic domain types and ports.
//!
//! Nothing in this module imports actix or Diesel; inbound adapters map
//! the error type onto HTTP responses and outbound adapters implement the
//! ports against real infrastructure.

mod error;
pub mod ports;
mod telemetry;

pub use error::{Error, ErrorCode};
pub use telemetry::{ExportRecord, TelemetryRecord};
