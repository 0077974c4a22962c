//! Basic-auth gate for the administrative endpoints.
//!
//! Keep the HTTP modules focused on request/response mapping by
//! concentrating credential parsing and checking here. Credentials are
//! compared by SHA-256 digest equality, so the comparison does not leak
//! how much of a guess was correct through its timing.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::future::{Ready, ready};
use sha2::{Digest, Sha256};

use crate::domain::Error;

/// Configured administrator credentials, shared as app data.
#[derive(Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    /// Wrap the configured administrator username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Compare a provided credential pair against the configured one.
    ///
    /// Both halves are always checked so a failure reveals nothing about
    /// which one was wrong.
    pub fn check(&self, username: &str, password: &str) -> bool {
        digest_eq(username, &self.username) & digest_eq(password, &self.password)
    }
}

fn digest_eq(provided: &str, expected: &str) -> bool {
    Sha256::digest(provided.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Extractor proving the request carried valid administrator credentials.
///
/// Rejection produces the 401 challenge before the handler body runs, so
/// failed requests never reach the store or backup adapters.
#[derive(Debug)]
pub struct AdminGuard;

impl FromRequest for AdminGuard {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}

fn authorize(req: &HttpRequest) -> Result<AdminGuard, Error> {
    let Some(credentials) = req.app_data::<web::Data<AdminCredentials>>() else {
        return Err(Error::internal("admin credentials not configured"));
    };
    let (username, password) =
        parse_basic_auth(req).ok_or_else(|| Error::unauthorized("authentication required"))?;
    if credentials.check(&username, &password) {
        Ok(AdminGuard)
    } else {
        // Deliberately the same message for a bad username and a bad password.
        Err(Error::unauthorized("authentication required"))
    }
}

fn parse_basic_auth(req: &HttpRequest) -> Option<(String, String)> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(BASE64.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_owned(), password.to_owned()))
}
