use crate::Condition;
use crate::OrderBy;
use crate::Value;
use crate::query::push_where;
use crate::query::quote_identifier;

/// SELECT builder over one table
///
/// ```ignore
/// let (sql, params) = Select::new("users", vec!["id".into(), "name".into()])
///     .filter(Condition::eq("name", "Alice"))
///     .limit(1)
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct Select {
    table:      String,
    columns:    Vec<String>,
    conditions: Vec<Condition>,
    order_by:   Vec<OrderBy>,
    limit:      Option<usize>,
    offset:     Option<usize>,
}

impl Select {
    pub fn new(table: &str, columns: Vec<String>) -> Self {
        Self {
            table: table.to_string(),
            columns,
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn build(&self) -> (String, Vec<Value>) {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.iter().map(|c| quote_identifier(c)).collect::<Vec<_>>().join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", columns, quote_identifier(&self.table));
        let mut params = Vec::new();
        push_where(&mut sql, &mut params, &self.conditions);

        if !self.order_by.is_empty() {
            let order_parts: Vec<String> = self.order_by.iter().map(|o| o.to_string()).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_parts.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset {
            // SQLite needs a LIMIT before OFFSET
            if self.limit.is_none() {
                sql.push_str(" LIMIT -1");
            }
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        (sql, params)
    }

    /// COUNT(*) over the same filters, ignoring ordering and paging.
    pub fn build_count(&self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(&self.table));
        let mut params = Vec::new();
        push_where(&mut sql, &mut params, &self.conditions);
        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        vec!["id".to_string(), "name".to_string()]
    }

    #[test]
    fn test_select_all() {
        let (sql, params) = Select::new("users", columns()).build();
        assert_eq!(sql, "SELECT \"id\", \"name\" FROM \"users\"");
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_star_without_columns() {
        let (sql, _) = Select::new("users", vec![]).build();
        assert_eq!(sql, "SELECT * FROM \"users\"");
    }

    #[test]
    fn test_select_with_filter_and_limit() {
        let (sql, params) = Select::new("users", columns()).filter(Condition::eq("id", 1)).limit(1).build();
        assert_eq!(sql, "SELECT \"id\", \"name\" FROM \"users\" WHERE \"id\" = ? LIMIT 1");
        assert_eq!(params, vec![Value::Integer(1)]);
    }

    #[test]
    fn test_select_multiple_filters() {
        let (sql, params) = Select::new("users", columns())
            .filter(Condition::eq("name", "a"))
            .filter(Condition::gt("id", 3))
            .build();
        assert_eq!(sql, "SELECT \"id\", \"name\" FROM \"users\" WHERE (\"name\" = ?) AND (\"id\" > ?)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_select_order_limit_offset() {
        let (sql, _) = Select::new("users", columns()).order_by(OrderBy::desc("id")).limit(10).offset(20).build();
        assert_eq!(sql, "SELECT \"id\", \"name\" FROM \"users\" ORDER BY \"id\" DESC LIMIT 10 OFFSET 20");
    }

    #[test]
    fn test_select_offset_without_limit() {
        let (sql, _) = Select::new("users", columns()).offset(5).build();
        assert!(sql.ends_with("LIMIT -1 OFFSET 5"));
    }

    #[test]
    fn test_build_count() {
        let (sql, params) =
            Select::new("users", columns()).filter(Condition::eq("name", "a")).limit(3).build_count();
        assert_eq!(sql, "SELECT COUNT(*) FROM \"users\" WHERE \"name\" = ?");
        assert_eq!(params, vec![Value::Text("a".into())]);
    }
}
