//! Query execution seam between entities and storage

use std::collections::HashMap;

use async_trait::async_trait;

use crate::Condition;
use crate::error::Result;
use crate::query::Insert;
use crate::query::Update;
use crate::value::Value;

/// One fetched row, keyed by column name
pub type RowData = HashMap<String, Value>;

/// Storage operations the persistence layer relies on
///
/// [`crate::Connection`] implements this over Turso. Other back ends only
/// need `execute`, `fetch_rows` and `last_insert_id`; the insert and update
/// helpers build their SQL from those.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a statement and return the number of affected rows.
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64>;

    /// Run a query and key each row by `columns`, positionally.
    async fn fetch_rows(&self, sql: &str, params: Vec<Value>, columns: &[String]) -> Result<Vec<RowData>>;

    async fn fetch_row(&self, sql: &str, params: Vec<Value>, columns: &[String]) -> Result<Option<RowData>> {
        Ok(self.fetch_rows(sql, params, columns).await?.into_iter().next())
    }

    /// Identifier generated by the most recent insert, if any.
    fn last_insert_id(&self) -> Option<i64>;

    /// Insert one row and return the generated identifier, if any.
    async fn insert(&self, table: &str, values: Vec<(String, Value)>) -> Result<Option<i64>> {
        let (sql, params) = Insert::new(table).values(values).build();
        self.execute(&sql, params).await?;
        Ok(self.last_insert_id())
    }

    /// Update the rows matching `filter` and return the affected count.
    async fn update(&self, table: &str, values: Vec<(String, Value)>, filter: Condition) -> Result<u64> {
        let (sql, params) = Update::new(table).sets(values).filter(filter).build()?;
        self.execute(&sql, params).await
    }
}

/// Select the `alias_` prefixed keys of a joined row.
///
/// The prefix is removed from the returned keys unless `skip_strip` is set.
pub fn filter_strip_row(row: &RowData, alias: &str, skip_strip: bool) -> RowData {
    let prefix = format!("{}_", alias);
    row.iter()
        .filter_map(|(key, value)| {
            let stripped = key.strip_prefix(&prefix)?;
            let key = if skip_strip { key.clone() } else { stripped.to_string() };
            Some((key, value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockExecutor;
    use crate::test_support::Recorded;
    use crate::test_support::row;

    #[test]
    fn test_filter_strip_row() {
        let joined = row(&[
            ("u_id", Value::Integer(1)),
            ("u_name", Value::Text("a".into())),
            ("p_id", Value::Integer(9)),
        ]);

        let users = filter_strip_row(&joined, "u", false);
        assert_eq!(users, row(&[("id", Value::Integer(1)), ("name", Value::Text("a".into()))]));

        let kept = filter_strip_row(&joined, "p", true);
        assert_eq!(kept, row(&[("p_id", Value::Integer(9))]));
    }

    #[tokio::test]
    async fn test_default_insert_builds_sql() {
        let executor = MockExecutor::new();
        executor.set_next_insert_id(Some(12));

        let id = executor
            .insert("users", vec![("name".to_string(), Value::Text("a".into()))])
            .await
            .unwrap();

        assert_eq!(id, Some(12));
        assert_eq!(
            executor.calls(),
            vec![Recorded::Execute {
                sql:    "INSERT INTO \"users\" (\"name\") VALUES (?)".to_string(),
                params: vec![Value::Text("a".into())],
            }]
        );
    }

    #[tokio::test]
    async fn test_default_update_builds_sql() {
        let executor = MockExecutor::new();
        executor
            .update("users", vec![("name".to_string(), Value::Text("b".into()))], Condition::eq("id", 4))
            .await
            .unwrap();

        assert_eq!(
            executor.calls(),
            vec![Recorded::Execute {
                sql:    "UPDATE \"users\" SET \"name\" = ? WHERE \"id\" = ?".to_string(),
                params: vec![Value::Text("b".into()), Value::Integer(4)],
            }]
        );
    }

    #[tokio::test]
    async fn test_default_fetch_row_takes_first() {
        let executor = MockExecutor::new();
        executor.push_rows(vec![row(&[("id", Value::Integer(1))]), row(&[("id", Value::Integer(2))])]);

        let first = executor.fetch_row("SELECT 1", vec![], &["id".to_string()]).await.unwrap();
        assert_eq!(first, Some(row(&[("id", Value::Integer(1))])));
    }
}
