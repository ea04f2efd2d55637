use crate::IntoValue;
use crate::Value;
use crate::query::quote_identifier;

/// A WHERE clause fragment with its bound parameters
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub(crate) sql:    String,
    pub(crate) values: Vec<Value>,
}

impl Condition {
    pub fn eq<V: IntoValue>(column: &str, value: V) -> Self {
        Self { sql: format!("{} = ?", quote_identifier(column)), values: vec![value.into_value()] }
    }

    pub fn ne<V: IntoValue>(column: &str, value: V) -> Self {
        Self { sql: format!("{} != ?", quote_identifier(column)), values: vec![value.into_value()] }
    }

    pub fn gt<V: IntoValue>(column: &str, value: V) -> Self {
        Self { sql: format!("{} > ?", quote_identifier(column)), values: vec![value.into_value()] }
    }

    pub fn lt<V: IntoValue>(column: &str, value: V) -> Self {
        Self { sql: format!("{} < ?", quote_identifier(column)), values: vec![value.into_value()] }
    }

    pub fn is_null(column: &str) -> Self {
        Self { sql: format!("{} IS NULL", quote_identifier(column)), values: vec![] }
    }

    pub fn raw(sql: impl Into<String>, values: Vec<Value>) -> Self {
        Self { sql: sql.into(), values }
    }

    pub fn and(self, other: Condition) -> Self {
        let mut values = self.values;
        values.extend(other.values);
        Self { sql: format!("({}) AND ({})", self.sql, other.sql), values }
    }

    pub fn or(self, other: Condition) -> Self {
        let mut values = self.values;
        values.extend(other.values);
        Self { sql: format!("({}) OR ({})", self.sql, other.sql), values }
    }

    /// Flat conjunction of simple predicates, in the given order.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let mut parts = Vec::new();
        let mut values = Vec::new();
        for condition in conditions {
            parts.push(condition.sql);
            values.extend(condition.values);
        }
        Self { sql: parts.join(" AND "), values }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,

    Desc,
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Order::Asc => write!(f, "ASC"),
            Order::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrderBy {
    pub(crate) column:    String,
    pub(crate) direction: Order,
}

impl OrderBy {
    pub fn asc(column: &str) -> Self {
        Self { column: column.to_string(), direction: Order::Asc }
    }

    pub fn desc(column: &str) -> Self {
        Self { column: column.to_string(), direction: Order::Desc }
    }
}

impl std::fmt::Display for OrderBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", quote_identifier(&self.column), self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_eq() {
        let cond = Condition::eq("id", 42);
        assert_eq!(cond.sql(), "\"id\" = ?");
        assert_eq!(cond.values(), &[Value::Integer(42)]);
    }

    #[test]
    fn test_condition_comparisons() {
        assert_eq!(Condition::ne("name", "x").sql(), "\"name\" != ?");
        assert_eq!(Condition::gt("qty", 1).sql(), "\"qty\" > ?");
        assert_eq!(Condition::lt("qty", 9).sql(), "\"qty\" < ?");
        assert!(Condition::is_null("deleted_at").values().is_empty());
    }

    #[test]
    fn test_condition_and_or() {
        let cond = Condition::eq("a", 1).and(Condition::eq("b", 2));
        assert_eq!(cond.sql(), "(\"a\" = ?) AND (\"b\" = ?)");
        assert_eq!(cond.values(), &[Value::Integer(1), Value::Integer(2)]);

        let cond = Condition::eq("a", 1).or(Condition::is_null("b"));
        assert_eq!(cond.sql(), "(\"a\" = ?) OR (\"b\" IS NULL)");
    }

    #[test]
    fn test_condition_all_keeps_order() {
        let cond = Condition::all([Condition::eq("id", 3), Condition::eq("second_id", 2)]);
        assert_eq!(cond.sql(), "\"id\" = ? AND \"second_id\" = ?");
        assert_eq!(cond.into_values(), vec![Value::Integer(3), Value::Integer(2)]);
    }

    #[test]
    fn test_condition_raw() {
        let cond = Condition::raw("qty BETWEEN ? AND ?", vec![Value::Integer(1), Value::Integer(5)]);
        assert_eq!(cond.sql(), "qty BETWEEN ? AND ?");
        assert_eq!(cond.values().len(), 2);
    }

    #[test]
    fn test_order_by_display() {
        assert_eq!(OrderBy::asc("name").to_string(), "\"name\" ASC");
        assert_eq!(OrderBy::desc("id").to_string(), "\"id\" DESC");
    }
}
