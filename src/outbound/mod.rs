//! Outbound adapters implementing the domain ports.

pub mod backup;
pub mod persistence;
