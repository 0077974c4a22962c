//! Server construction and middleware wiring.

mod config;

pub use config::AppSettings;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware, config::CookieContentSecurity, storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::Error;
use crate::inbound::http::admin::{backup, dashboard, delete_all, entry_detail, export};
use crate::inbound::http::auth::AdminCredentials;
use crate::inbound::http::public::{get_data, get_ip, home, insert_data, latest, status};
use crate::inbound::http::state::HttpState;
use crate::middleware::RequestTrace;
use crate::outbound::backup::FileSnapshotStore;
use crate::outbound::persistence::{DbPool, PoolConfig, SqliteTelemetryStore, run_migrations};

/// Dependencies shared by every worker's `App` instance.
#[derive(Clone)]
pub struct AppDependencies {
    /// Handler state bundling the store and snapshot ports.
    pub state: web::Data<HttpState>,
    /// Configured administrator credentials.
    pub credentials: web::Data<AdminCredentials>,
    /// Session cookie signing key.
    pub key: Key,
    /// Whether the session cookie carries the `Secure` flag.
    pub cookie_secure: bool,
}

impl AppDependencies {
    /// Wire the production adapters from settings: open the database,
    /// apply migrations, and load the session key.
    pub fn from_settings(settings: &AppSettings) -> std::io::Result<Self> {
        let pool = DbPool::new(PoolConfig::new(settings.database_path()))
            .map_err(std::io::Error::other)?;
        run_migrations(&pool).map_err(std::io::Error::other)?;

        let store = Arc::new(SqliteTelemetryStore::new(pool.clone()));
        let snapshots = Arc::new(FileSnapshotStore::new(pool, settings.backup_dir()));

        Ok(Self {
            state: web::Data::new(HttpState::new(store, snapshots)),
            credentials: web::Data::new(AdminCredentials::new(
                settings.admin_username(),
                settings.admin_password(),
            )),
            key: settings.session_key()?,
            cookie_secure: settings.cookie_secure,
        })
    }
}

/// Assemble the application: session middleware, request tracing, JSON
/// error mapping, and the full route table.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        state,
        credentials,
        key,
        cookie_secure,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(SameSite::Lax)
        .build();

    // Malformed JSON bodies should use the same envelope as every other
    // failure.
    let json_errors = web::JsonConfig::default()
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into());

    let app = App::new()
        .app_data(state)
        .app_data(credentials)
        .app_data(json_errors)
        .wrap(session)
        .wrap(RequestTrace)
        .service(home)
        .service(status)
        .service(get_ip)
        .service(get_data)
        .service(latest)
        .service(insert_data)
        .service(dashboard)
        .service(entry_detail)
        .service(export)
        .service(backup)
        .service(delete_all);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from settings.
///
/// # Errors
/// Propagates [`std::io::Error`] when opening the database, loading the
/// session key, or binding the socket fails.
pub fn create_server(settings: &AppSettings) -> std::io::Result<Server> {
    let deps = AppDependencies::from_settings(settings)?;
    let bind = (settings.bind_address().to_owned(), settings.port());

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind)?
        .run();
    Ok(server)
}
