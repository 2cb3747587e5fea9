//! Database Connection Management
//!
//! This module provides the `Database` executor: an explicit, cloneable handle
//! around one connection pool. Every model operation funnels through its two
//! primitives, [`Database::query`] and [`Database::execute`].
//!
//! ## Features
//!
//! - **Connection Pooling**: one checked-out connection per call, returned on every exit path
//! - **Placeholder Rewriting**: callers write `?`, the pool decides the native syntax
//! - **Explicit Lifecycle**: `connect` creates the pool, `shutdown` drains it
//! - **Bounded Waits**: optional timeout on connection acquisition

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::info;

use crate::config::PoolOptions;
use crate::database::driver::{Connection, Pool, PooledConnection, rewrite_placeholders};
use crate::database::mysql::MySqlDriver;
use crate::database::values::{DatabaseValue, Row};
use crate::error::{OrmError, Result};

/// Handle to a connection pool plus the executor primitives built on it.
///
/// Cloning is cheap; every clone shares the same pool.
///
/// # Example
///
/// ```rust,no_run
/// use tablemodel::{Database, DatabaseValue, PoolOptions};
///
/// async fn example() -> tablemodel::Result<()> {
///     let db = Database::connect(&PoolOptions::new("www-data", "www-data", "awesome")).await?;
///     let rows = db.query("select `id` from `users` where `admin`=?", &[DatabaseValue::from(true)], None).await?;
///     println!("{} admins", rows.len());
///     db.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct Database<P: Pool = MySqlDriver> {
    inner: Arc<Inner<P>>,
}

struct Inner<P> {
    pool: P,
    closed: AtomicBool,
    acquire_timeout: Option<Duration>,
}

impl<P: Pool> Clone for Database<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Database<MySqlDriver> {
    /// Creates the MySQL connection pool described by `options`.
    pub async fn connect(options: &PoolOptions) -> Result<Self> {
        info!("create database connection pool...");
        let pool = MySqlDriver::connect(options).await?;
        Ok(Self::with_pool(pool, options.acquire_timeout_duration()))
    }
}

impl<P: Pool> Database<P> {
    /// Wraps an already constructed pool.
    pub fn with_pool(pool: P, acquire_timeout: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Inner {
                pool,
                closed: AtomicBool::new(false),
                acquire_timeout,
            }),
        }
    }

    pub fn pool(&self) -> &P {
        &self.inner.pool
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Closes the pool and waits for in-flight connections to drain.
    ///
    /// Later calls to `query` or `execute` fail with [`OrmError::PoolClosed`].
    /// Concurrent or repeated calls all wait for the same drain.
    pub async fn shutdown(&self) {
        let first = !self.inner.closed.swap(true, Ordering::AcqRel);
        self.inner.pool.close().await;
        if first {
            info!("database connection pool closed");
        }
    }

    async fn acquire(&self) -> Result<PooledConnection<'_, P>> {
        if self.is_closed() {
            return Err(OrmError::PoolClosed);
        }
        match self.inner.acquire_timeout {
            Some(timeout) => tokio::time::timeout(timeout, PooledConnection::acquire(&self.inner.pool))
                .await
                .map_err(|_| OrmError::AcquireTimeout(timeout))?,
            None => PooledConnection::acquire(&self.inner.pool).await,
        }
    }

    /// Runs a row-returning statement.
    ///
    /// Fetches at most `limit` rows when given, otherwise all of them.
    pub async fn query(
        &self,
        sql: &str,
        args: &[DatabaseValue],
        limit: Option<usize>,
    ) -> Result<Vec<Row>> {
        info!("SQL: {}", sql);
        let mut conn = self.acquire().await?;
        let sql = rewrite_placeholders(sql, self.inner.pool.placeholder_style());
        let rows = conn.fetch(&sql, args, limit).await?;
        info!("rows returned: {}", rows.len());
        Ok(rows)
    }

    /// Runs an insert, update or delete and returns the affected row count.
    ///
    /// A commit is always issued, whether or not the pool autocommits.
    pub async fn execute(&self, sql: &str, args: &[DatabaseValue]) -> Result<u64> {
        info!("SQL: {}", sql);
        let mut conn = self.acquire().await?;
        let sql = rewrite_placeholders(sql, self.inner.pool.placeholder_style());
        let affected = conn.execute(&sql, args).await?;
        conn.commit().await?;
        Ok(affected)
    }
}
