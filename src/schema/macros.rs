//! Declaration Macro
//!
//! `declare_model!` turns a struct-like declaration into a marker type whose
//! `register()` builds the model once per process and hands out the cached
//! handle afterwards.

/// Declares a model type.
///
/// Each entry maps an attribute to a field builder expression. An optional
/// `as "table"` overrides the table name, which otherwise is the type name.
///
/// # Returns
/// The generated `register()` returns `Result<Model, SchemaError>`; a
/// declaration without exactly one primary key fails on the first call.
///
/// # Example
/// ```rust
/// use tablemodel::declare_model;
/// use tablemodel::schema::field::{BooleanField, FloatField, StringField};
/// use tablemodel::utils::defaults::{next_id, now};
///
/// declare_model! {
///     /// A registered user.
///     pub struct User as "users" {
///         id: StringField::new().primary_key().column_type("varchar(50)").default_with(next_id),
///         email: StringField::new().column_type("varchar(50)"),
///         admin: BooleanField::new(),
///         created_at: FloatField::new().default_with(now),
///     }
/// }
///
/// let users = User::register().unwrap();
/// assert_eq!(users.metadata().table_name(), "users");
/// assert_eq!(users.metadata().fields(), ["email", "admin", "created_at"]);
/// ```
#[macro_export]
macro_rules! declare_model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(as $table:literal)? {
            $($attr:ident : $field:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis struct $name;

        impl $name {
            pub fn register() -> ::std::result::Result<$crate::Model, $crate::SchemaError> {
                static MODEL: ::std::sync::OnceLock<$crate::Model> = ::std::sync::OnceLock::new();
                if let Some(model) = MODEL.get() {
                    return Ok(model.clone());
                }
                let model = $crate::schema::ModelDecl::new(stringify!($name))
                    $(.table($table))?
                    $(.field(stringify!($attr), $field))*
                    .register()?;
                Ok(MODEL.get_or_init(|| model).clone())
            }
        }
    };
}
