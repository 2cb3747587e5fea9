//! MySQL driver over sqlx.
//!
//! Implements the [`Pool`] / [`Connection`] boundary with `sqlx::MySqlPool`.
//! Arguments are bound by their `DatabaseValue` variant and rows are decoded
//! column by column using the type MySQL reports.

use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPoolOptions, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::{Column, Executor, MySql, MySqlPool, Row as _, TypeInfo, ValueRef};
use time::{Date, PrimitiveDateTime, Time};
use tracing::{info, warn};

use crate::config::PoolOptions;
use crate::database::driver::{Connection, PlaceholderStyle, Pool};
use crate::database::values::{DatabaseValue, Row};
use crate::error::{OrmError, Result};
use crate::utils::time::format_timestamp;

/// Stand-in for "no limit": sqlx always needs an acquire deadline.
const UNBOUNDED_WAIT: Duration = Duration::from_secs(u32::MAX as u64);

pub struct MySqlDriver {
    pool: MySqlPool,
    acquire_timeout: Duration,
}

impl MySqlDriver {
    pub async fn connect(options: &PoolOptions) -> Result<Self> {
        options.validate()?;

        let connect_options = MySqlConnectOptions::new()
            .host(&options.host)
            .port(options.port)
            .username(&options.user)
            .password(&options.password)
            .database(&options.db)
            .charset(mysql_charset(&options.charset));

        let autocommit = options.autocommit;
        let acquire_timeout = options.acquire_timeout_duration().unwrap_or(UNBOUNDED_WAIT);
        let pool_options = MySqlPoolOptions::new()
            .max_connections(options.max_pool_size)
            .min_connections(options.min_pool_size)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    if !autocommit {
                        conn.execute("SET autocommit=0").await?;
                    }
                    Ok(())
                })
            })
            .acquire_timeout(acquire_timeout);

        // The first connection is bounded even when later waits are not.
        let connect_timeout = options.connect_timeout_duration();
        let pool = match tokio::time::timeout(connect_timeout, pool_options.connect_with(connect_options)).await {
            Ok(pool) => pool.map_err(|err| acquire_error(err, acquire_timeout.min(connect_timeout)))?,
            Err(_) => {
                warn!(
                    "no connection to mysql://{}@{}:{}/{} within {:?}",
                    options.user, options.host, options.port, options.db, connect_timeout
                );
                return Err(OrmError::AcquireTimeout(connect_timeout));
            }
        };
        info!(
            "connected to mysql://{}@{}:{}/{}",
            options.user, options.host, options.port, options.db
        );
        Ok(Self {
            pool,
            acquire_timeout,
        })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        let acquire_timeout = pool.options().get_acquire_timeout();
        Self {
            pool,
            acquire_timeout,
        }
    }

    pub fn inner(&self) -> &MySqlPool {
        &self.pool
    }
}

/// sqlx reports an exhausted wait as `PoolTimedOut`; callers see the same
/// error the executor's own timeout produces.
fn acquire_error(err: sqlx::Error, timeout: Duration) -> OrmError {
    match err {
        sqlx::Error::PoolTimedOut => OrmError::AcquireTimeout(timeout),
        err => OrmError::Database(err),
    }
}

/// MySQL has no `utf-8` charset; the common spellings map to `utf8mb4`.
fn mysql_charset(charset: &str) -> &str {
    match charset.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" | "utf8mb4" => "utf8mb4",
        _ => charset,
    }
}

pub struct MySqlConnection {
    conn: PoolConnection<MySql>,
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &'q DatabaseValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        DatabaseValue::Null => query.bind(None::<String>),
        DatabaseValue::Boolean(b) => query.bind(*b),
        DatabaseValue::Int(i) => query.bind(*i),
        DatabaseValue::Float(f) => query.bind(*f),
        DatabaseValue::String(s) | DatabaseValue::Text(s) => query.bind(s.as_str()),
    }
}

fn build_query<'q>(sql: &'q str, args: &'q [DatabaseValue]) -> Query<'q, MySql, MySqlArguments> {
    args.iter()
        .fold(sqlx::query(sql), |query, value| bind_value(query, value))
}

fn decode_row(row: &MySqlRow) -> Result<Row> {
    let mut decoded = Row::new();
    for column in row.columns() {
        let index = column.ordinal();
        let is_null = row.try_get_raw(index)?.is_null();
        let value = if is_null {
            DatabaseValue::Null
        } else {
            decode_column(row, index, column.type_info().name())?
        };
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}

fn decode_column(row: &MySqlRow, index: usize, type_name: &str) -> Result<DatabaseValue> {
    let type_name = type_name.to_ascii_uppercase();
    let value = match type_name.as_str() {
        "BOOLEAN" => DatabaseValue::Boolean(row.try_get::<bool, _>(index)?),
        "FLOAT" => DatabaseValue::Float(f64::from(row.try_get::<f32, _>(index)?)),
        "DOUBLE" => DatabaseValue::Float(row.try_get::<f64, _>(index)?),
        "DATETIME" | "TIMESTAMP" => {
            DatabaseValue::String(format_timestamp(row.try_get::<PrimitiveDateTime, _>(index)?))
        }
        "DATE" => DatabaseValue::String(row.try_get::<Date, _>(index)?.to_string()),
        "TIME" => DatabaseValue::String(row.try_get::<Time, _>(index)?.to_string()),
        "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "TINYTEXT" => {
            DatabaseValue::Text(row.try_get_unchecked::<String, _>(index)?)
        }
        "DECIMAL" => decimal_value(&row.try_get_unchecked::<String, _>(index)?),
        // Both arrive as raw unsigned integers; sqlx only checks the unsigned flag.
        "YEAR" | "BIT" => unsigned_value(row.try_get_unchecked::<u64, _>(index)?),
        name if name.contains("INT") && name.ends_with("UNSIGNED") => {
            unsigned_value(row.try_get::<u64, _>(index)?)
        }
        name if name.contains("INT") => DatabaseValue::Int(row.try_get::<i64, _>(index)?),
        // VARCHAR, CHAR, DECIMAL, ENUM and friends arrive as text.
        _ => DatabaseValue::String(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}

fn unsigned_value(value: u64) -> DatabaseValue {
    match i64::try_from(value) {
        Ok(value) => DatabaseValue::Int(value),
        Err(_) => DatabaseValue::String(value.to_string()),
    }
}

/// Whole decimals (e.g. `sum(bigint)`) become `Int`, fractional ones `Float`.
/// Anything neither can hold stays as text.
fn decimal_value(raw: &str) -> DatabaseValue {
    if let Ok(value) = raw.parse::<i64>() {
        return DatabaseValue::Int(value);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && raw.contains('.') => DatabaseValue::Float(value),
        _ => DatabaseValue::String(raw.to_string()),
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn fetch(
        &mut self,
        sql: &str,
        args: &[DatabaseValue],
        limit: Option<usize>,
    ) -> Result<Vec<Row>> {
        let query = build_query(sql, args);
        let rows: Vec<MySqlRow> = match limit {
            Some(limit) => {
                query
                    .fetch(&mut *self.conn)
                    .take(limit)
                    .try_collect()
                    .await?
            }
            None => query.fetch_all(&mut *self.conn).await?,
        };
        rows.iter().map(decode_row).collect()
    }

    async fn execute(&mut self, sql: &str, args: &[DatabaseValue]) -> Result<u64> {
        let result = build_query(sql, args).execute(&mut *self.conn).await?;
        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> Result<()> {
        (&mut *self.conn).execute("COMMIT").await?;
        Ok(())
    }
}

#[async_trait]
impl Pool for MySqlDriver {
    type Connection = MySqlConnection;

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Question
    }

    async fn acquire(&self) -> Result<MySqlConnection> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|err| acquire_error(err, self.acquire_timeout))?;
        Ok(MySqlConnection { conn })
    }

    fn release(&self, conn: MySqlConnection) {
        // Dropping a sqlx PoolConnection hands it back to the pool.
        drop(conn);
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
