//! Public ingest and query endpoints.
//!
//! ```text
//! GET  /
//! GET  /api/status
//! GET  /api/get-ip
//! GET  /api/data?address=aa:bb:cc:dd:ee:ff
//! GET  /api/latest
//! POST /api/insert_data {"address":"aa:bb:cc:dd:ee:ff","temp":21.5}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::domain::{Error, TelemetryRecord};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::state::HttpState;

/// Liveness greeting.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is up", content_type = "text/plain")),
    tags = ["public"],
    security([])
)]
#[get("/")]
pub async fn home() -> &'static str {
    "Hello, Welcome to the Backend!"
}

/// Health check reporting the running version.
#[utoipa::path(
    get,
    path = "/api/status",
    responses((status = 200, description = "Service status with version and timestamp")),
    tags = ["public"],
    security([])
)]
#[get("/api/status")]
pub async fn status() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Echo the caller's resolved address.
#[utoipa::path(
    get,
    path = "/api/get-ip",
    responses((status = 200, description = "Resolved caller address")),
    tags = ["public"],
    security([])
)]
#[get("/api/get-ip")]
pub async fn get_ip(req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ip": resolve_caller_ip(&req) }))
}

/// First `X-Forwarded-For` entry wins over the transport-level peer
/// address, matching what callers behind a reverse proxy expect.
fn resolve_caller_ip(req: &HttpRequest) -> String {
    forwarded_for_first(req).unwrap_or_else(|| {
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_owned())
    })
}

fn forwarded_for_first(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get("x-forwarded-for")?.to_str().ok()?;
    let first = header.split(',').next()?.trim();
    (!first.is_empty()).then(|| first.to_owned())
}

/// Query string for `GET /api/data`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct DataQuery {
    /// Case-insensitive address filter; omitted or empty returns all records.
    pub address: Option<String>,
}

/// List records, optionally filtered by address.
#[utoipa::path(
    get,
    path = "/api/data",
    params(DataQuery),
    responses(
        (status = 200, description = "Merged records", body = [TelemetryRecord]),
        (status = 500, description = "Storage fault", body = ErrorBody)
    ),
    tags = ["public"],
    security([])
)]
#[get("/api/data")]
pub async fn get_data(
    state: web::Data<HttpState>,
    query: web::Query<DataQuery>,
) -> ApiResult<web::Json<Vec<TelemetryRecord>>> {
    // An empty filter means "no filter".
    let filter = query.address.as_deref().filter(|a| !a.is_empty());
    let records = state.store.query(filter).await?;
    Ok(web::Json(records))
}

/// Return the most recently assigned record.
#[utoipa::path(
    get,
    path = "/api/latest",
    responses(
        (status = 200, description = "Latest entry"),
        (status = 404, description = "Empty store", body = ErrorBody)
    ),
    tags = ["public"],
    security([])
)]
#[get("/api/latest")]
pub async fn latest(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let record = state
        .store
        .latest()
        .await?
        .ok_or_else(|| Error::not_found("No entries found in database"))?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "entry": {
            "id": record.id,
            "address": record.address,
            "timestamp": record.recorded_at,
            "data": Value::Object(record.payload),
        },
    })))
}

/// Ingest a telemetry reading.
///
/// The body is an arbitrary JSON object; the `address` key (defaulting to
/// the empty string when absent) is split out and the remainder is stored
/// verbatim as the payload.
#[utoipa::path(
    post,
    path = "/api/insert_data",
    request_body = Object,
    responses(
        (status = 201, description = "Record created"),
        (status = 400, description = "Body is not a JSON object", body = ErrorBody),
        (status = 500, description = "Storage fault", body = ErrorBody)
    ),
    tags = ["public"],
    security([])
)]
#[post("/api/insert_data")]
pub async fn insert_data(
    state: web::Data<HttpState>,
    body: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let mut payload = body.into_inner();
    let address = match payload.remove("address") {
        Some(Value::String(address)) => address,
        Some(Value::Null) | None => String::new(),
        // Non-string addresses are kept as their JSON text rather than rejected.
        Some(other) => other.to_string(),
    };
    let id = state.store.insert(address, payload).await?;
    debug!(id, "telemetry entry stored");
    Ok(HttpResponse::Created().json(json!({ "message": "add successfully" })))
}
