//! OpenAPI documentation assembly for Swagger UI and tooling.

use utoipa::OpenApi;

/// Public OpenAPI surface. The HTML admin views are presentation-only and
/// are deliberately not documented here.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::public::home,
        crate::inbound::http::public::status,
        crate::inbound::http::public::get_ip,
        crate::inbound::http::public::get_data,
        crate::inbound::http::public::latest,
        crate::inbound::http::public::insert_data,
        crate::inbound::http::admin::export,
        crate::inbound::http::admin::backup,
        crate::inbound::http::admin::delete_all,
    ),
    components(schemas(
        crate::domain::TelemetryRecord,
        crate::domain::ExportRecord,
        crate::inbound::http::error::ErrorBody,
    )),
    tags(
        (name = "public", description = "Unauthenticated ingest and query endpoints"),
        (name = "admin", description = "Basic-auth-guarded administrative endpoints"),
    )
)]
pub struct ApiDoc;
