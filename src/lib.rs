//! tablemodel
//!
//! A small declarative ORM over MySQL. Models are declared once, with
//! [`ModelDecl`] or [`declare_model!`], and get their select, insert, update
//! and delete SQL generated at registration. Records then read and write
//! themselves through a pooled [`Database`] executor.
//!
//! ```rust,no_run
//! use tablemodel::{declare_model, Database, FindAll, PoolOptions};
//! use tablemodel::schema::field::{FloatField, StringField, TextField};
//! use tablemodel::utils::defaults::{next_id, now};
//!
//! declare_model! {
//!     pub struct Blog as "blogs" {
//!         id: StringField::new().primary_key().column_type("varchar(50)").default_with(next_id),
//!         name: StringField::new().column_type("varchar(50)"),
//!         content: TextField::new(),
//!         created_at: FloatField::new().default_with(now),
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> tablemodel::Result<()> {
//!     let db = Database::connect(&PoolOptions::from_env()?).await?;
//!     let blogs = Blog::register()?;
//!
//!     let mut blog = blogs.new_record().with("name", "First post").with("content", "Hello");
//!     blog.save(&db).await?;
//!
//!     for blog in blogs.find_all(&db, FindAll::new().order_by("created_at desc")).await? {
//!         println!("{}", serde_json::to_string(&blog).unwrap_or_default());
//!     }
//!
//!     db.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod model;
pub mod schema;
pub mod utils;

pub use config::PoolOptions;
pub use database::connection::Database;
pub use database::driver::{Connection, PlaceholderStyle, Pool, PooledConnection};
pub use database::mysql::MySqlDriver;
pub use database::values::{DatabaseValue, Row};
pub use error::{OrmError, Result, SchemaError};
pub use model::{FindAll, Limit, Model, Record};
pub use schema::field::{
    BooleanField, Field, FieldDefault, FieldKind, FloatField, IntegerField, StringField, TextField,
};
pub use schema::{ModelDecl, TableMetadata};
