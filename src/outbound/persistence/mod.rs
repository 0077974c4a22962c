//! SQLite persistence adapter built on Diesel.

mod models;
mod pool;
mod schema;
mod sqlite_store;

pub use pool::{DbPool, PoolConfig, PoolError};
pub use sqlite_store::SqliteTelemetryStore;

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::domain::Error;

/// Migrations compiled into the binary so deployments need no separate
/// schema step.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending migrations. Run once at startup, and by test harnesses
/// against their scratch databases.
pub fn run_migrations(pool: &DbPool) -> Result<(), Error> {
    let mut conn = pool.get().map_err(|err| Error::storage(err.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|err| Error::storage(format!("migrations failed: {err}")))
}
