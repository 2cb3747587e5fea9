//! Model Types and Finders
//!
//! A [`Model`] is the handle registration hands back: cheap to clone, it
//! carries the model's [`TableMetadata`] and offers the type-level finders.
//! Individual rows are [`Record`]s.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tablemodel::{Database, FindAll, ModelDecl};
//! use tablemodel::schema::field::{FloatField, StringField};
//!
//! async fn example(db: &Database) -> tablemodel::Result<()> {
//!     let blogs = ModelDecl::new("Blog")
//!         .table("blogs")
//!         .field("id", StringField::new().primary_key())
//!         .field("name", StringField::new())
//!         .field("created_at", FloatField::new())
//!         .register()?;
//!
//!     let latest = blogs
//!         .find_all(db, FindAll::new().order_by("created_at desc").limit((0i64, 10i64)))
//!         .await?;
//!     let total = blogs.find_number(db, "count(id)", None, &[]).await?;
//!     println!("{} of {:?} blogs", latest.len(), total);
//!     Ok(())
//! }
//! ```

mod query;
mod record;

use std::sync::Arc;

use crate::database::connection::Database;
use crate::database::driver::Pool;
use crate::database::values::{DatabaseValue, Row};
use crate::error::Result;
use crate::schema::TableMetadata;

pub use query::{FindAll, Limit};
pub use record::Record;

/// Registered model handle.
#[derive(Debug, Clone)]
pub struct Model {
    meta: Arc<TableMetadata>,
}

impl Model {
    pub(crate) fn new(meta: TableMetadata) -> Self {
        Self {
            meta: Arc::new(meta),
        }
    }

    pub fn metadata(&self) -> &TableMetadata {
        &self.meta
    }

    /// Whether both handles come from the same registration.
    pub fn same_as(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.meta, &other.meta)
    }

    /// An empty record, to be filled in before `save`.
    pub fn new_record(&self) -> Record {
        Record::new(self.clone(), Row::new())
    }

    pub fn record_from_row(&self, row: Row) -> Record {
        Record::new(self.clone(), row)
    }

    /// Finds one record by primary key.
    pub async fn find<P: Pool>(
        &self,
        db: &Database<P>,
        primary_key: impl Into<DatabaseValue>,
    ) -> Result<Option<Record>> {
        let sql = format!(
            "{} where `{}`=?",
            self.meta.select_sql(),
            self.meta.column(self.meta.primary_key())
        );
        let primary_key: DatabaseValue = primary_key.into();
        let rows = db.query(&sql, &[primary_key], Some(1)).await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| self.record_from_row(row)))
    }

    /// Finds every record matching the optional where / order by / limit
    /// clauses, in the order the database returns them.
    pub async fn find_all<P: Pool>(&self, db: &Database<P>, query: FindAll) -> Result<Vec<Record>> {
        let (sql, args) = query.build(self.meta.select_sql());
        let rows = db.query(&sql, &args, None).await?;
        Ok(rows
            .into_iter()
            .map(|row| self.record_from_row(row))
            .collect())
    }

    /// Runs an aggregate such as `count(id)` and returns its single value.
    pub async fn find_number<P: Pool>(
        &self,
        db: &Database<P>,
        select_expr: &str,
        where_clause: Option<&str>,
        args: &[DatabaseValue],
    ) -> Result<Option<DatabaseValue>> {
        let mut sql = format!(
            "select {} as __num__ from `{}`",
            select_expr,
            self.meta.table_name()
        );
        if let Some(clause) = where_clause.filter(|c| !c.is_empty()) {
            sql.push_str(" where ");
            sql.push_str(clause);
        }
        let rows = db.query(&sql, args, Some(1)).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.get("__num__").cloned()))
    }
}
