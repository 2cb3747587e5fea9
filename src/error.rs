//! Error types for tablemodel
//!
//! Definition-time problems (a model declared without exactly one primary
//! key) are reported as [`SchemaError`]; everything that can go wrong while
//! talking to the database is an [`OrmError`].

use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrmError>;

/// Raised while registering a model declaration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("no primary key found for model {model}")]
    MissingPrimaryKey { model: String },

    #[error("duplicate primary key for field {field} in model {model}")]
    DuplicatePrimaryKey { model: String, field: String },

    #[error("field {field} declared more than once in model {model}")]
    DuplicateField { model: String, field: String },
}

#[derive(Error, Debug)]
pub enum OrmError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("record has no attribute {0}")]
    AttributeNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("connection pool is closed")]
    PoolClosed,

    #[error("timed out after {0:?} waiting for a pooled connection")]
    AcquireTimeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_primary_key_names_the_field() {
        let err = SchemaError::DuplicatePrimaryKey {
            model: "User".into(),
            field: "email".into(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate primary key for field email in model User"
        );
    }

    #[test]
    fn schema_errors_convert_into_orm_errors() {
        let err: OrmError = SchemaError::MissingPrimaryKey {
            model: "Blog".into(),
        }
        .into();
        assert!(matches!(
            err,
            OrmError::Schema(SchemaError::MissingPrimaryKey { .. })
        ));
    }
}
