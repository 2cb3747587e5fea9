//! Finder arguments.

use crate::database::values::DatabaseValue;
use crate::error::OrmError;

/// Row limit for `Model::find_all`: `limit ?` or `limit ?, ?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(i64),
    Range { offset: i64, count: i64 },
}

impl Limit {
    pub(crate) fn placeholders(&self) -> &'static str {
        match self {
            Limit::Count(_) => "?",
            Limit::Range { .. } => "?, ?",
        }
    }

    pub(crate) fn args(&self) -> Vec<DatabaseValue> {
        match *self {
            Limit::Count(count) => vec![DatabaseValue::Int(count)],
            Limit::Range { offset, count } => {
                vec![DatabaseValue::Int(offset), DatabaseValue::Int(count)]
            }
        }
    }
}

impl From<i64> for Limit {
    fn from(count: i64) -> Self {
        Limit::Count(count)
    }
}

impl From<(i64, i64)> for Limit {
    fn from((offset, count): (i64, i64)) -> Self {
        Limit::Range { offset, count }
    }
}

fn limit_int(value: &DatabaseValue) -> Result<i64, OrmError> {
    match value {
        DatabaseValue::Int(i) => Ok(*i),
        other => Err(OrmError::InvalidArgument(format!(
            "Invalid limit value: {}",
            other
        ))),
    }
}

/// Accepts a single integer value; anything else is rejected.
impl TryFrom<&DatabaseValue> for Limit {
    type Error = OrmError;

    fn try_from(value: &DatabaseValue) -> Result<Self, Self::Error> {
        limit_int(value).map(Limit::Count)
    }
}

/// Accepts one integer (`count`) or two (`offset`, `count`).
impl TryFrom<&[DatabaseValue]> for Limit {
    type Error = OrmError;

    fn try_from(values: &[DatabaseValue]) -> Result<Self, Self::Error> {
        match values {
            [count] => Ok(Limit::Count(limit_int(count)?)),
            [offset, count] => Ok(Limit::Range {
                offset: limit_int(offset)?,
                count: limit_int(count)?,
            }),
            _ => Err(OrmError::InvalidArgument(format!(
                "Invalid limit value: expected 1 or 2 integers, got {}",
                values.len()
            ))),
        }
    }
}

/// Optional clauses for `Model::find_all`.
///
/// `where_clause` and `order_by` are raw SQL fragments; values go through
/// `args` with `?` placeholders.
#[derive(Debug, Clone, Default)]
pub struct FindAll {
    pub where_clause: Option<String>,
    pub args: Vec<DatabaseValue>,
    pub order_by: Option<String>,
    pub limit: Option<Limit>,
}

impl FindAll {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, clause: impl Into<String>, args: Vec<DatabaseValue>) -> Self {
        self.where_clause = Some(clause.into());
        self.args = args;
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn limit(mut self, limit: impl Into<Limit>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Appends the clauses to `select` and returns the statement with its
    /// arguments.
    pub(crate) fn build(self, select: &str) -> (String, Vec<DatabaseValue>) {
        let mut sql = vec![select.to_string()];
        let mut args = self.args;

        if let Some(clause) = self.where_clause.filter(|c| !c.is_empty()) {
            sql.push("where".to_string());
            sql.push(clause);
        }
        if let Some(order_by) = self.order_by.filter(|o| !o.is_empty()) {
            sql.push("order by".to_string());
            sql.push(order_by);
        }
        if let Some(limit) = self.limit {
            sql.push("limit".to_string());
            sql.push(limit.placeholders().to_string());
            args.extend(limit.args());
        }
        (sql.join(" "), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECT: &str = "select `id`, `name` from `users`";

    #[test]
    fn bare_find_all_is_the_select_template() {
        let (sql, args) = FindAll::new().build(SELECT);
        assert_eq!(sql, SELECT);
        assert!(args.is_empty());
    }

    #[test]
    fn single_limit_appends_one_placeholder() {
        let (sql, args) = FindAll::new().limit(5i64).build(SELECT);
        assert_eq!(sql, format!("{} limit ?", SELECT));
        assert_eq!(args, vec![DatabaseValue::Int(5)]);
    }

    #[test]
    fn range_limit_appends_offset_then_count() {
        let (sql, args) = FindAll::new()
            .filter("`name`=?", vec![DatabaseValue::from("alice")])
            .order_by("`created_at` desc")
            .limit((10i64, 5i64))
            .build(SELECT);
        assert_eq!(
            sql,
            format!("{} where `name`=? order by `created_at` desc limit ?, ?", SELECT)
        );
        assert_eq!(
            args,
            vec![
                DatabaseValue::from("alice"),
                DatabaseValue::Int(10),
                DatabaseValue::Int(5)
            ]
        );
    }

    #[test]
    fn malformed_limits_are_invalid_arguments() {
        let err = Limit::try_from(&DatabaseValue::from("x")).unwrap_err();
        assert!(matches!(err, OrmError::InvalidArgument(_)));

        let three: [DatabaseValue; 3] = [1i64.into(), 2i64.into(), 3i64.into()];
        let err = Limit::try_from(&three[..]).unwrap_err();
        assert!(matches!(err, OrmError::InvalidArgument(_)));

        let empty: [DatabaseValue; 0] = [];
        assert!(Limit::try_from(&empty[..]).is_err());

        let mixed = [DatabaseValue::Int(1), DatabaseValue::Float(2.5)];
        assert!(Limit::try_from(&mixed[..]).is_err());
    }

    #[test]
    fn well_formed_limits_convert() {
        assert_eq!(Limit::try_from(&DatabaseValue::Int(7)).unwrap(), Limit::Count(7));
        let pair = [DatabaseValue::Int(10), DatabaseValue::Int(5)];
        assert_eq!(
            Limit::try_from(&pair[..]).unwrap(),
            Limit::Range { offset: 10, count: 5 }
        );
    }
}
