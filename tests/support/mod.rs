//! Shared harness for HTTP integration tests.
//!
//! Builds the real application with real adapters against a scratch
//! SQLite database, so the tests exercise the same wiring production uses.

// Not every test binary touches every helper.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::web;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tempfile::TempDir;

use telemetry_backend::inbound::http::auth::AdminCredentials;
use telemetry_backend::inbound::http::state::HttpState;
use telemetry_backend::outbound::backup::FileSnapshotStore;
use telemetry_backend::outbound::persistence::{
    DbPool, PoolConfig, SqliteTelemetryStore, run_migrations,
};
use telemetry_backend::server::AppDependencies;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "hunter2";

/// Application dependencies plus the scratch directory keeping the
/// database and backups alive for the test's duration.
pub struct TestHarness {
    pub deps: AppDependencies,
    pub dir: TempDir,
}

impl TestHarness {
    pub fn backup_dir(&self) -> PathBuf {
        self.dir.path().join("backups")
    }
}

/// Harness with working adapters.
pub fn harness() -> TestHarness {
    build(false)
}

/// Harness whose snapshot store points at a path occupied by a regular
/// file, so every snapshot attempt fails.
pub fn harness_with_failing_backups() -> TestHarness {
    build(true)
}

fn build(failing_backups: bool) -> TestHarness {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = DbPool::new(PoolConfig::new(dir.path().join("telemetry.db"))).expect("pool");
    run_migrations(&pool).expect("migrations");

    let backup_dir = dir.path().join("backups");
    if failing_backups {
        std::fs::write(&backup_dir, b"blocks directory creation").expect("write blocker");
    }

    let store = Arc::new(SqliteTelemetryStore::new(pool.clone()));
    let snapshots = Arc::new(FileSnapshotStore::new(pool, backup_dir));

    let deps = AppDependencies {
        state: web::Data::new(HttpState::new(store, snapshots)),
        credentials: web::Data::new(AdminCredentials::new(ADMIN_USER, ADMIN_PASSWORD)),
        key: Key::generate(),
        cookie_secure: false,
    };
    TestHarness { deps, dir }
}

/// `Authorization` header carrying the harness admin credentials.
pub fn basic_auth() -> (&'static str, String) {
    (
        "Authorization",
        format!(
            "Basic {}",
            BASE64.encode(format!("{ADMIN_USER}:{ADMIN_PASSWORD}"))
        ),
    )
}

/// Pull the `session` cookie out of a response.
pub fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Pull the CSRF token out of the dashboard's meta tag.
pub fn extract_csrf_token(html: &str) -> String {
    let marker = "name=\"csrf-token\" content=\"";
    let start = html.find(marker).expect("csrf meta tag") + marker.len();
    let rest = &html[start..];
    let end = rest.find('"').expect("closing quote");
    rest[..end].to_owned()
}
