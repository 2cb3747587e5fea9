//! Field descriptors.
//!
//! A [`Field`] describes one column: optional explicit column name, SQL type,
//! primary-key flag and default. The five builders below are the only way to
//! make one, and only the key-eligible kinds expose `primary_key()`.

use std::fmt::{self, Display};
use std::sync::Arc;

use crate::database::values::DatabaseValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Integer,
    Float,
    Text,
}

impl FieldKind {
    fn type_name(self) -> &'static str {
        match self {
            FieldKind::String => "StringField",
            FieldKind::Boolean => "BooleanField",
            FieldKind::Integer => "IntegerField",
            FieldKind::Float => "FloatField",
            FieldKind::Text => "TextField",
        }
    }
}

/// Where a missing value comes from when a record is saved.
#[derive(Clone, Default)]
pub enum FieldDefault {
    #[default]
    None,
    Value(DatabaseValue),
    Producer(Arc<dyn Fn() -> DatabaseValue + Send + Sync>),
}

impl FieldDefault {
    /// Produces the default, calling the producer if there is one.
    pub fn resolve(&self) -> Option<DatabaseValue> {
        match self {
            FieldDefault::None => None,
            FieldDefault::Value(value) => Some(value.clone()),
            FieldDefault::Producer(producer) => Some(producer()),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::None => f.write_str("None"),
            FieldDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
            FieldDefault::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    name: Option<String>,
    kind: FieldKind,
    column_type: String,
    primary_key: bool,
    default: FieldDefault,
}

impl Field {
    fn new(kind: FieldKind, column_type: &str, default: FieldDefault) -> Self {
        Self {
            name: None,
            kind,
            column_type: column_type.to_string(),
            primary_key: false,
            default,
        }
    }

    /// Explicit column name, if it differs from the attribute name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn column_type(&self) -> &str {
        &self.column_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn default(&self) -> &FieldDefault {
        &self.default
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}, {}, {}>",
            self.kind.type_name(),
            self.column_type,
            self.name.as_deref().unwrap_or("None")
        )
    }
}

macro_rules! field_builder {
    ($(#[$meta:meta])* $builder:ident, $kind:ident, $column_type:literal, $default:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $builder(Field);

        impl $builder {
            pub fn new() -> Self {
                Self(Field::new(FieldKind::$kind, $column_type, $default))
            }

            /// Maps the attribute to a differently named column.
            pub fn named(mut self, column: impl Into<String>) -> Self {
                self.0.name = Some(column.into());
                self
            }

            pub fn default_value(mut self, value: impl Into<DatabaseValue>) -> Self {
                self.0.default = FieldDefault::Value(value.into());
                self
            }

            /// Computes the default at save time, e.g. a fresh id or timestamp.
            pub fn default_with<F, V>(mut self, producer: F) -> Self
            where
                F: Fn() -> V + Send + Sync + 'static,
                V: Into<DatabaseValue>,
            {
                self.0.default = FieldDefault::Producer(Arc::new(move || producer().into()));
                self
            }
        }

        impl Default for $builder {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<$builder> for Field {
            fn from(builder: $builder) -> Field {
                builder.0
            }
        }
    };
}

macro_rules! primary_key_builder {
    ($($builder:ident),*) => {
        $(
            impl $builder {
                pub fn primary_key(mut self) -> Self {
                    self.0.primary_key = true;
                    self
                }
            }
        )*
    };
}

field_builder!(
    /// `varchar(100)` unless overridden, no default.
    StringField, String, "varchar(100)", FieldDefault::None
);
field_builder!(
    /// `boolean`, no default. Never a primary key.
    BooleanField, Boolean, "boolean", FieldDefault::None
);
field_builder!(
    /// `bigint`, defaults to `0`.
    IntegerField, Integer, "bigint", FieldDefault::Value(DatabaseValue::Int(0))
);
field_builder!(
    /// `real`, defaults to `0.0`.
    FloatField, Float, "real", FieldDefault::Value(DatabaseValue::Float(0.0))
);
field_builder!(
    /// `text`, no default. Never a primary key.
    TextField, Text, "text", FieldDefault::None
);

primary_key_builder!(StringField, IntegerField, FloatField);

impl StringField {
    pub fn column_type(mut self, column_type: impl Into<String>) -> Self {
        self.0.column_type = column_type.into();
        self
    }
}
