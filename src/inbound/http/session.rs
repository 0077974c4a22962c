//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The only session state this service keeps is the admin dashboard's
//! CSRF token: issued fresh on every dashboard render, required verbatim
//! to authorise the destructive delete call.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::Error;

pub(crate) const CSRF_TOKEN_KEY: &str = "csrf_token";
const CSRF_TOKEN_BYTES: usize = 32;

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Generate a fresh random token, store it in the session (replacing
    /// and thereby invalidating any prior token) and return it for
    /// embedding in the rendered page.
    pub fn issue_csrf_token(&self) -> Result<String, Error> {
        let mut bytes = [0u8; CSRF_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        self.0
            .insert(CSRF_TOKEN_KEY, token.clone())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))?;
        Ok(token)
    }

    /// True only when `provided` is non-empty and exactly matches the
    /// token currently stored in the session.
    pub fn verify_csrf_token(&self, provided: &str) -> Result<bool, Error> {
        if provided.is_empty() {
            return Ok(false);
        }
        let stored = self
            .0
            .get::<String>(CSRF_TOKEN_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(stored.is_some_and(|token| token == provided))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
