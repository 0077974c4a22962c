//! Administrative endpoints: dashboard, entry detail, export, backup, and
//! the CSRF-guarded delete-all.
//!
//! Every route here requires basic-auth via [`AdminGuard`]; the guard runs
//! as an extractor, so rejected requests never touch the store or the
//! snapshot adapter.

use std::path::Path;

use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::SnapshotTag;
use crate::domain::{Error, ExportRecord, TelemetryRecord};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AdminGuard;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Header carrying the CSRF token for the destructive delete call.
pub const CSRF_HEADER: &str = "x-csrf-token";

const HTML: &str = "text/html; charset=utf-8";
const PLAIN: &str = "text/plain; charset=utf-8";

/// Render the admin dashboard and rotate the session's CSRF token.
#[get("/admin/db")]
pub async fn dashboard(
    _admin: AdminGuard,
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let token = session.issue_csrf_token()?;
    let records = state.store.query(None).await?;
    Ok(HttpResponse::Ok()
        .content_type(HTML)
        .body(render_dashboard(&records, &token)))
}

/// Render a single entry, or a plain-text not-found message.
#[get("/admin/entry/{id}")]
pub async fn entry_detail(
    _admin: AdminGuard,
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    match state.store.find(id).await? {
        Some(record) => Ok(HttpResponse::Ok()
            .content_type(HTML)
            .body(render_entry(&record))),
        None => Ok(HttpResponse::NotFound()
            .content_type(PLAIN)
            .body(format!("entry {id} not found"))),
    }
}

/// Dump the full table, payload parsed into a `data` field.
#[utoipa::path(
    get,
    path = "/api/admin/export",
    responses(
        (status = 200, description = "Full table dump", body = [ExportRecord]),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody)
    ),
    tags = ["admin"]
)]
#[get("/api/admin/export")]
pub async fn export(
    _admin: AdminGuard,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ExportRecord>>> {
    let records = state.store.query(None).await?;
    Ok(web::Json(
        records.into_iter().map(ExportRecord::from).collect(),
    ))
}

/// Take a manual snapshot of the database.
#[utoipa::path(
    post,
    path = "/api/admin/backup",
    responses(
        (status = 200, description = "Snapshot written"),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 500, description = "Snapshot failed", body = ErrorBody)
    ),
    tags = ["admin"]
)]
#[post("/api/admin/backup")]
pub async fn backup(_admin: AdminGuard, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let path = state.snapshots.snapshot(SnapshotTag::Manual).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": format!("backup written to {}", file_name(&path)),
        "timestamp": Utc::now(),
    })))
}

/// Destroy every record, strictly ordered behind a successful snapshot.
///
/// Order: credentials (extractor) → CSRF token → snapshot → delete. A
/// failed snapshot aborts before anything is destroyed.
#[utoipa::path(
    delete,
    path = "/api/admin/delete_all",
    responses(
        (status = 200, description = "All records deleted after a successful snapshot"),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 403, description = "CSRF token missing or invalid", body = ErrorBody),
        (status = 500, description = "Snapshot or delete failed; data untouched", body = ErrorBody)
    ),
    tags = ["admin"]
)]
#[delete("/api/admin/delete_all")]
pub async fn delete_all(
    _admin: AdminGuard,
    session: SessionContext,
    req: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let provided = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !session.verify_csrf_token(provided)? {
        warn!("delete-all rejected: CSRF token missing or stale");
        return Err(Error::forbidden("CSRF token missing or invalid"));
    }

    // The snapshot must land before anything is destroyed.
    let backup_path = state.snapshots.snapshot(SnapshotTag::BeforeDelete).await?;
    let deleted = state.store.delete_all().await?;
    info!(deleted, backup = %backup_path.display(), "all telemetry entries deleted");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": format!("deleted {deleted} entries"),
        "backup_created": file_name(&backup_path),
        "timestamp": Utc::now(),
    })))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn render_dashboard(records: &[TelemetryRecord], token: &str) -> String {
    let rows: String = records
        .iter()
        .map(|record| {
            format!(
                "<tr><td><a href=\"/admin/entry/{id}\">{id}</a></td>\
                 <td>{address}</td><td>{timestamp}</td></tr>\n",
                id = record.id,
                address = escape_html(&record.address),
                timestamp = record.recorded_at.to_rfc3339(),
            )
        })
        .collect();
    format!(
        "<!doctype html>\n<html>\n<head>\n<title>Telemetry admin</title>\n\
         <meta name=\"csrf-token\" content=\"{token}\">\n</head>\n<body>\n\
         <h1>Telemetry entries ({count})</h1>\n\
         <table>\n<tr><th>id</th><th>address</th><th>timestamp</th></tr>\n\
         {rows}</table>\n</body>\n</html>\n",
        count = records.len(),
    )
}

fn render_entry(record: &TelemetryRecord) -> String {
    let payload =
        serde_json::to_string_pretty(&record.payload).unwrap_or_else(|_| "{}".to_owned());
    format!(
        "<!doctype html>\n<html>\n<head>\n<title>Entry {id}</title>\n</head>\n<body>\n\
         <h1>Entry {id}</h1>\n\
         <p>address: {address}</p>\n<p>timestamp: {timestamp}</p>\n\
         <pre>{payload}</pre>\n\
         <p><a href=\"/admin/db\">back</a></p>\n</body>\n</html>\n",
        id = record.id,
        address = escape_html(&record.address),
        timestamp = record.recorded_at.to_rfc3339(),
        payload = escape_html(&payload),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn sample_record() -> TelemetryRecord {
        TelemetryRecord {
            id: 1,
            address: "<script>".into(),
            recorded_at: Utc::now(),
            payload: json!({ "temp": 21.5 }).as_object().cloned().expect("object"),
        }
    }

    #[rstest]
    fn dashboard_embeds_token_and_escapes_addresses() {
        let html = render_dashboard(&[sample_record()], "tok123");
        assert!(html.contains("name=\"csrf-token\" content=\"tok123\""));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[rstest]
    fn entry_page_shows_payload() {
        let html = render_entry(&sample_record());
        assert!(html.contains("Entry 1"));
        assert!(html.contains("21.5"));
    }

    #[rstest]
    #[case("a&b", "a&amp;b")]
    #[case("\"quoted\"", "&quot;quoted&quot;")]
    #[case("plain", "plain")]
    fn escaping(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_html(raw), expected);
    }
}
