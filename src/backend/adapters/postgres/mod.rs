//! `PostgreSQL` connection adapter using Diesel and r2d2.
//!
//! Backends that store their managers in `PostgreSQL` can return a
//! [`PostgresConnection`] from `Connect` and recover the pool in their
//! manager factories through [`StoreConnection::as_any`].

use crate::backend::ports::{BackendResult, ConnectionHandle, StoreConnection};
use diesel::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// `PostgreSQL` connection pool type.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Pool sizing used by [`PostgresConnection::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum number of pooled connections.
    pub max_size: u32,
    /// How long to wait for a connection before failing.
    pub connection_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: 10,
            connection_timeout: Duration::from_secs(30),
        }
    }
}

/// Pooled `PostgreSQL` connection exposed as a [`StoreConnection`].
#[derive(Clone)]
pub struct PostgresConnection {
    pool: PgPool,
}

impl PostgresConnection {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool for `url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns the pool error when no connection can be established.
    pub fn connect(url: &str) -> BackendResult<ConnectionHandle> {
        Self::connect_with(url, PoolSettings::default())
    }

    /// Builds a pool for `url` with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns the pool error when no connection can be established within
    /// `settings.connection_timeout`.
    pub fn connect_with(url: &str, settings: PoolSettings) -> BackendResult<ConnectionHandle> {
        let manager = ConnectionManager::<PgConnection>::new(url);
        let pool = Pool::builder()
            .max_size(settings.max_size)
            .connection_timeout(settings.connection_timeout)
            .build(manager)?;
        Ok(Arc::new(Self::new(pool)))
    }

    /// Returns the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl StoreConnection for PostgresConnection {
    fn ping(&self) -> BackendResult<()> {
        let mut conn = self.pool.get()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// Keep the connection string out of logs.
impl fmt::Debug for PostgresConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.state();
        f.debug_struct("PostgresConnection")
            .field("max_size", &self.pool.max_size())
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}
