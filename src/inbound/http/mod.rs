//! HTTP inbound adapter exposing the public and administrative endpoints.

pub mod admin;
pub mod auth;
pub mod error;
pub mod public;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
