//! Driver Boundary
//!
//! The executor never talks to a database library directly. It goes through the
//! [`Pool`] and [`Connection`] traits defined here, which capture the handful of
//! operations it needs: acquire, fetch, execute, commit, release and close.
//! [`super::mysql::MySqlDriver`] implements them over sqlx; tests plug in a fake.

use std::borrow::Cow;
use std::ops::{Deref, DerefMut};

use async_trait::async_trait;
use tracing::debug;

use crate::database::values::{DatabaseValue, Row};
use crate::error::Result;

/// How a driver spells positional parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`, as used by MySQL and SQLite.
    Question,
    /// `%s`, as used by Python-style DB-API drivers.
    Format,
    /// `$1`, `$2`, ... as used by PostgreSQL.
    Numbered,
}

/// Rewrites every `?` in `sql` into the driver's native placeholder.
///
/// Model code only ever writes `?`; this is the one place that knows what the
/// driver actually expects.
pub fn rewrite_placeholders(sql: &str, style: PlaceholderStyle) -> Cow<'_, str> {
    match style {
        PlaceholderStyle::Question => Cow::Borrowed(sql),
        PlaceholderStyle::Format => Cow::Owned(sql.replace('?', "%s")),
        PlaceholderStyle::Numbered => {
            let mut rewritten = String::with_capacity(sql.len() + 8);
            let mut index = 0;
            for c in sql.chars() {
                if c == '?' {
                    index += 1;
                    rewritten.push('$');
                    rewritten.push_str(&index.to_string());
                } else {
                    rewritten.push(c);
                }
            }
            Cow::Owned(rewritten)
        }
    }
}

/// A live connection checked out of a [`Pool`].
#[async_trait]
pub trait Connection: Send {
    /// Runs a row-returning statement and collects up to `limit` rows, or all
    /// of them when `limit` is `None`.
    async fn fetch(
        &mut self,
        sql: &str,
        args: &[DatabaseValue],
        limit: Option<usize>,
    ) -> Result<Vec<Row>>;

    /// Runs a statement and returns the number of affected rows.
    async fn execute(&mut self, sql: &str, args: &[DatabaseValue]) -> Result<u64>;

    async fn commit(&mut self) -> Result<()>;
}

/// A bounded, shared set of connections.
#[async_trait]
pub trait Pool: Send + Sync + 'static {
    type Connection: Connection;

    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Checks a connection out, suspending while the pool is exhausted.
    async fn acquire(&self) -> Result<Self::Connection>;

    /// Hands a connection back. Called exactly once per successful acquire.
    fn release(&self, conn: Self::Connection);

    /// Closes the pool and waits for checked-out connections to come back.
    /// Every caller waits, including ones arriving after the pool closed.
    async fn close(&self);
}

/// Scoped ownership of one pooled connection.
///
/// The connection goes back to its pool when the guard is dropped, whichever
/// way the caller leaves the scope.
pub struct PooledConnection<'a, P: Pool> {
    pool: &'a P,
    conn: Option<P::Connection>,
}

impl<'a, P: Pool> PooledConnection<'a, P> {
    pub async fn acquire(pool: &'a P) -> Result<Self> {
        let conn = pool.acquire().await?;
        debug!("acquired pooled connection");
        Ok(Self {
            pool,
            conn: Some(conn),
        })
    }
}

impl<P: Pool> Deref for PooledConnection<'_, P> {
    type Target = P::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn
            .as_ref()
            .expect("connection is held until the guard drops")
    }
}

impl<P: Pool> DerefMut for PooledConnection<'_, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn
            .as_mut()
            .expect("connection is held until the guard drops")
    }
}

impl<P: Pool> Drop for PooledConnection<'_, P> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn);
            debug!("released pooled connection");
        }
    }
}
