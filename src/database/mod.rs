//! Database Execution Layer
//!
//! This module owns everything between the model layer and the wire: the
//! pooled executor, the driver boundary it talks to, and the value type that
//! crosses it.
//!
//! ## Overview
//!
//! Model operations never touch a driver directly. They build SQL with `?`
//! placeholders and hand it, together with positional [`values::DatabaseValue`]
//! arguments, to [`connection::Database`]. The executor:
//! - checks out one connection from the pool for the duration of the call
//! - rewrites `?` into the driver's native placeholder syntax
//! - fetches rows (optionally capped) or executes and commits
//! - returns the connection on every exit path, errors included
//!
//! ## Module Structure
//!
//! - `connection.rs` - `Database` executor and pool lifecycle
//! - `driver.rs` - `Pool` / `Connection` traits and placeholder rewriting
//! - `mysql.rs` - sqlx-backed MySQL implementation of the driver traits
//! - `values.rs` - `DatabaseValue` and the ordered `Row` mapping
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tablemodel::{Database, DatabaseValue, PoolOptions};
//!
//! async fn example() -> tablemodel::Result<()> {
//!     let options = PoolOptions::from_env()?;
//!     let db = Database::connect(&options).await?;
//!
//!     let affected = db
//!         .execute("update `users` set `admin`=? where `id`=?", &[true.into(), "u1".into()])
//!         .await?;
//!     assert_eq!(affected, 1);
//!
//!     let rows = db.query("select `id`, `email` from `users`", &[], Some(10)).await?;
//!     for row in rows {
//!         println!("{:?}", row.get("email"));
//!     }
//!
//!     db.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Driver failures surface as [`crate::error::OrmError::Database`]; using a
//! shut down executor yields [`crate::error::OrmError::PoolClosed`].

pub mod connection;
pub mod driver;
pub mod mysql;
pub mod values;

#[cfg(test)]
pub(crate) mod fake;
