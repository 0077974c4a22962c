//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into the service's JSON error
//! envelope and status codes.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::{Error, ErrorCode};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// JSON envelope returned by every failing API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Always the literal `"error"`.
    #[schema(example = "error")]
    pub status: String,
    /// Human-readable description, safe to show to callers.
    #[schema(example = "No entries found in database")]
    pub message: String,
}

/// Challenge sent with every 401 so browsers prompt for basic auth.
pub(crate) const BASIC_CHALLENGE: &str = "Basic realm=\"telemetry-admin\"";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::StorageFault | ErrorCode::BackupFault | ErrorCode::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// 500-class messages carry io/SQL detail; replace them with fixed text so
/// internal paths never reach clients.
fn public_message(error: &Error) -> String {
    match error.code() {
        ErrorCode::StorageFault => "storage operation failed".to_owned(),
        ErrorCode::BackupFault => "backup failed; no data was deleted".to_owned(),
        ErrorCode::Internal => "internal server error".to_owned(),
        _ => error.message().to_owned(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!(code = ?self.code(), message = %self.message(), "request failed");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if self.code() == ErrorCode::Unauthorized {
            builder.insert_header((header::WWW_AUTHENTICATE, BASIC_CHALLENGE));
        }
        builder.json(ErrorBody {
            status: "error".to_owned(),
            message: public_message(self),
        })
    }
}
