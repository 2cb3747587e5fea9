//! Schema Reflection
//!
//! A model is declared once with [`ModelDecl`] (or the [`declare_model!`]
//! macro) and registered into an immutable [`TableMetadata`]: table name,
//! field mappings in declaration order, the primary key, and the four SQL
//! templates every record operation uses.
//!
//! ## Generated SQL
//!
//! For a `User` model with primary key `id` and fields `email`, `name`:
//!
//! ```sql
//! select `id`, `email`, `name` from `users`
//! insert into `users` (`email`, `name`, `id`) values(?,?,?)
//! update `users` set `email`=?, `name`=? where `id`=?
//! delete from `users` where `id`=?
//! ```
//!
//! Ordinary fields always come first and the primary key last in insert and
//! update, matching the argument order `Record::save` and `Record::update` build.
//!
//! [`declare_model!`]: crate::declare_model

pub mod field;
mod macros;

use std::collections::HashSet;

use tracing::info;

use crate::error::SchemaError;
use crate::model::Model;
use field::Field;

/// Immutable description of one model's table, computed at registration.
#[derive(Debug, Clone)]
pub struct TableMetadata {
    model_name: String,
    table_name: String,
    mappings: Vec<(String, Field)>,
    primary_key: String,
    fields: Vec<String>,
    select_sql: String,
    insert_sql: String,
    update_sql: String,
    delete_sql: String,
}

impl TableMetadata {
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Every declared field, primary key included, in declaration order.
    pub fn mappings(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.mappings
            .iter()
            .map(|(attr, field)| (attr.as_str(), field))
    }

    pub fn field(&self, attr: &str) -> Option<&Field> {
        self.mappings
            .iter()
            .find(|(name, _)| name == attr)
            .map(|(_, field)| field)
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Attribute names of the ordinary (non primary key) fields.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Column an attribute is stored in: the field's explicit name, or the
    /// attribute itself.
    pub fn column<'a>(&'a self, attr: &'a str) -> &'a str {
        self.field(attr).and_then(Field::name).unwrap_or(attr)
    }

    pub fn select_sql(&self) -> &str {
        &self.select_sql
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert_sql
    }

    pub fn update_sql(&self) -> &str {
        &self.update_sql
    }

    pub fn delete_sql(&self) -> &str {
        &self.delete_sql
    }
}

/// A model declaration waiting to be registered.
///
/// # Example
///
/// ```rust
/// use tablemodel::schema::ModelDecl;
/// use tablemodel::schema::field::{BooleanField, StringField};
///
/// let users = ModelDecl::new("User")
///     .table("users")
///     .field("id", StringField::new().primary_key())
///     .field("email", StringField::new())
///     .field("admin", BooleanField::new())
///     .register()
///     .unwrap();
///
/// assert_eq!(users.metadata().select_sql(), "select `id`, `email`, `admin` from `users`");
/// ```
#[derive(Debug, Clone)]
pub struct ModelDecl {
    name: String,
    table: Option<String>,
    fields: Vec<(String, Field)>,
}

impl ModelDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            fields: Vec::new(),
        }
    }

    /// Overrides the table name, which otherwise is the model name.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn field(mut self, attr: impl Into<String>, field: impl Into<Field>) -> Self {
        self.fields.push((attr.into(), field.into()));
        self
    }

    /// Validates the declaration and derives its table metadata.
    pub fn register(self) -> Result<Model, SchemaError> {
        self.reflect().map(Model::new)
    }

    fn reflect(self) -> Result<TableMetadata, SchemaError> {
        let table_name = self.table.unwrap_or_else(|| self.name.clone());
        info!("found model: {} (table: {})", self.name, table_name);

        let mut seen = HashSet::new();
        let mut primary_key: Option<String> = None;
        let mut fields = Vec::new();
        for (attr, field) in &self.fields {
            if !seen.insert(attr.as_str()) {
                return Err(SchemaError::DuplicateField {
                    model: self.name.clone(),
                    field: attr.clone(),
                });
            }
            info!("found mapping: {} ==> {}", attr, field);
            if field.is_primary_key() {
                if primary_key.is_some() {
                    return Err(SchemaError::DuplicatePrimaryKey {
                        model: self.name.clone(),
                        field: attr.clone(),
                    });
                }
                info!("found primary key: {}", attr);
                primary_key = Some(attr.clone());
            } else {
                fields.push(attr.clone());
            }
        }
        let primary_key = primary_key.ok_or_else(|| SchemaError::MissingPrimaryKey {
            model: self.name.clone(),
        })?;

        let mut metadata = TableMetadata {
            model_name: self.name,
            table_name,
            mappings: self.fields,
            primary_key,
            fields,
            select_sql: String::new(),
            insert_sql: String::new(),
            update_sql: String::new(),
            delete_sql: String::new(),
        };
        metadata.select_sql = select_sql(&metadata);
        metadata.insert_sql = insert_sql(&metadata);
        metadata.update_sql = update_sql(&metadata);
        metadata.delete_sql = delete_sql(&metadata);
        Ok(metadata)
    }
}

fn quoted(identifier: &str) -> String {
    format!("`{}`", identifier)
}

fn select_column(meta: &TableMetadata, attr: &str) -> String {
    let column = meta.column(attr);
    if column == attr {
        quoted(attr)
    } else {
        format!("{} as {}", quoted(column), quoted(attr))
    }
}

fn select_sql(meta: &TableMetadata) -> String {
    let columns: Vec<String> = std::iter::once(meta.primary_key())
        .chain(meta.fields().iter().map(String::as_str))
        .map(|attr| select_column(meta, attr))
        .collect();
    format!(
        "select {} from {}",
        columns.join(", "),
        quoted(meta.table_name())
    )
}

fn insert_sql(meta: &TableMetadata) -> String {
    let columns: Vec<String> = meta
        .fields()
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(meta.primary_key()))
        .map(|attr| quoted(meta.column(attr)))
        .collect();
    let placeholders = vec!["?"; columns.len()].join(",");
    format!(
        "insert into {} ({}) values({})",
        quoted(meta.table_name()),
        columns.join(", "),
        placeholders
    )
}

fn update_sql(meta: &TableMetadata) -> String {
    let pk = quoted(meta.column(meta.primary_key()));
    let assignments: Vec<String> = if meta.fields().is_empty() {
        vec![format!("{}=?", pk)]
    } else {
        meta.fields()
            .iter()
            .map(|attr| format!("{}=?", quoted(meta.column(attr))))
            .collect()
    };
    format!(
        "update {} set {} where {}=?",
        quoted(meta.table_name()),
        assignments.join(", "),
        pk
    )
}

fn delete_sql(meta: &TableMetadata) -> String {
    format!(
        "delete from {} where {}=?",
        quoted(meta.table_name()),
        quoted(meta.column(meta.primary_key()))
    )
}
