//! Connection pool for Diesel SQLite connections.
//!
//! SQLite has no async Diesel driver, so the pool hands out synchronous
//! connections and adapters run their queries on blocking threads. Each
//! acquired connection is switched to WAL with a busy timeout so
//! concurrent writers queue instead of failing immediately.

use std::path::Path;
use std::time::Duration;

use diesel::SqliteConnection;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Configuration for the SQLite connection pool.
///
/// # Example
///
/// ```ignore
/// let config = PoolConfig::new("telemetry.db")
///     .with_max_size(4)
///     .with_connection_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_path: String,
    max_size: u32,
    connection_timeout: Duration,
    busy_timeout: Duration,
}

impl PoolConfig {
    /// Create a new configuration for the given database file.
    ///
    /// Uses sensible defaults:
    /// - `max_size`: 8 connections
    /// - `connection_timeout`: 30 seconds
    /// - `busy_timeout`: 5 seconds
    pub fn new(database_path: impl AsRef<Path>) -> Self {
        Self {
            database_path: database_path.as_ref().to_string_lossy().into_owned(),
            max_size: 8,
            connection_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Set the maximum number of connections in the pool.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the connection checkout timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the SQLite busy timeout applied to every connection.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Get the database file path.
    pub fn database_path(&self) -> &str {
        &self.database_path
    }
}

/// Pragmas applied each time a connection is acquired.
///
/// `synchronous = FULL` because the store contract promises durability
/// before each mutating call returns.
#[derive(Debug, Clone, Copy)]
struct ConnectionPragmas {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA journal_mode = WAL; \
             PRAGMA synchronous = FULL; \
             PRAGMA busy_timeout = {}; \
             PRAGMA foreign_keys = ON;",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Connection pool for the file-backed SQLite database.
///
/// # Example
///
/// ```ignore
/// let pool = DbPool::new(PoolConfig::new("telemetry.db"))?;
/// let mut conn = pool.get()?;
/// // Use conn for Diesel operations...
/// ```
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<ConnectionManager<SqliteConnection>>,
}

impl DbPool {
    /// Create a new connection pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when the database file cannot be
    /// opened or created.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = ConnectionManager::<SqliteConnection>::new(config.database_path());

        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .connection_customizer(Box::new(ConnectionPragmas {
                busy_timeout: config.busy_timeout,
            }))
            .build(manager)
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner: pool })
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] if no connection becomes available
    /// within the configured timeout.
    pub fn get(
        &self,
    ) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, PoolError> {
        self.inner
            .get()
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
