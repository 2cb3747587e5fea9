//! Records
//!
//! A [`Record`] is one row of a model: a mutable attribute → value mapping
//! plus the instance-level operations that write it back.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, warn};

use super::Model;
use crate::database::connection::Database;
use crate::database::driver::Pool;
use crate::database::values::{DatabaseValue, Row};
use crate::error::{OrmError, Result};

#[derive(Debug, Clone)]
pub struct Record {
    model: Model,
    values: Row,
}

impl Record {
    pub(crate) fn new(model: Model, values: Row) -> Self {
        Self { model, values }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The raw attribute mapping, in insertion order.
    pub fn values(&self) -> &Row {
        &self.values
    }

    pub fn into_row(self) -> Row {
        self.values
    }

    /// Value of `attr`, or `None` if it was never set.
    pub fn get(&self, attr: &str) -> Option<&DatabaseValue> {
        self.values.get(attr)
    }

    /// Like [`Record::get`], but a missing attribute is an error.
    pub fn try_get(&self, attr: &str) -> Result<&DatabaseValue> {
        self.values
            .get(attr)
            .ok_or_else(|| OrmError::AttributeNotFound(attr.to_string()))
    }

    pub fn set(&mut self, attr: impl Into<String>, value: impl Into<DatabaseValue>) {
        self.values.push(attr, value);
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, attr: impl Into<String>, value: impl Into<DatabaseValue>) -> Self {
        self.set(attr, value);
        self
    }

    /// Value of `attr`, falling back to the field default when the value is
    /// missing or falsy. A resolved default is stored on the record, so a
    /// producer runs at most once per record.
    pub fn get_or_default(&mut self, attr: &str) -> Result<DatabaseValue> {
        let current = self.values.get(attr).cloned();
        if let Some(value) = current.as_ref().filter(|v| v.is_truthy()) {
            return Ok(value.clone());
        }

        let field = self
            .model
            .metadata()
            .field(attr)
            .ok_or_else(|| OrmError::AttributeNotFound(attr.to_string()))?;
        match field.default().resolve() {
            Some(value) => {
                debug!("using default value for {}: {}", attr, value);
                self.values.push(attr, value.clone());
                Ok(value)
            }
            None => Ok(current.unwrap_or_default()),
        }
    }

    fn value_or_null(&self, attr: &str) -> DatabaseValue {
        self.values.get(attr).cloned().unwrap_or_default()
    }

    /// Inserts the record. Missing values are filled from field defaults.
    ///
    /// Returns the affected row count; anything other than 1 is logged as a
    /// warning but not treated as an error.
    pub async fn save<P: Pool>(&mut self, db: &Database<P>) -> Result<u64> {
        let model = self.model.clone();
        let meta = model.metadata();

        let mut args = Vec::with_capacity(meta.fields().len() + 1);
        for attr in meta.fields() {
            args.push(self.get_or_default(attr)?);
        }
        args.push(self.get_or_default(meta.primary_key())?);

        let rows = db.execute(meta.insert_sql(), &args).await?;
        if rows != 1 {
            warn!("failed to insert record: affected rows: {}", rows);
        }
        Ok(rows)
    }

    /// Writes the current values back by primary key.
    pub async fn update<P: Pool>(&self, db: &Database<P>) -> Result<u64> {
        let meta = self.model.metadata();

        let mut args: Vec<DatabaseValue> = meta
            .fields()
            .iter()
            .map(|attr| self.value_or_null(attr))
            .collect();
        if meta.fields().is_empty() {
            args.push(self.value_or_null(meta.primary_key()));
        }
        args.push(self.value_or_null(meta.primary_key()));

        let rows = db.execute(meta.update_sql(), &args).await?;
        if rows != 1 {
            warn!("failed to update by primary key: affected rows: {}", rows);
        }
        Ok(rows)
    }

    /// Deletes the row with this record's primary key.
    pub async fn remove<P: Pool>(&self, db: &Database<P>) -> Result<u64> {
        let meta = self.model.metadata();
        let args = [self.value_or_null(meta.primary_key())];

        let rows = db.execute(meta.delete_sql(), &args).await?;
        if rows != 1 {
            warn!("failed to remove by primary key: affected rows: {}", rows);
        }
        Ok(rows)
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (attr, value) in self.values.iter() {
            map.serialize_entry(attr, value)?;
        }
        map.end()
    }
}
