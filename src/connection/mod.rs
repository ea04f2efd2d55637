pub(crate) mod database;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;

pub use database::Builder;
pub use database::Database;
use database::DatabaseOptions;

use crate::error::Error;
use crate::error::Result;
use crate::executor::Executor;
use crate::executor::RowData;
use crate::value::Value;

/// Turso connection implementing [`Executor`]
///
/// Clones share the same underlying connection and transaction state.
#[derive(Debug, Clone)]
pub struct Connection {
    inner:          turso::Connection,
    options:        DatabaseOptions,
    in_transaction: Arc<AtomicBool>,
}

impl Connection {
    fn new(inner: turso::Connection, options: DatabaseOptions) -> Self {
        Self { inner, options, in_transaction: Arc::new(AtomicBool::new(false)) }
    }

    pub fn is_mvcc_enabled(&self) -> bool {
        self.options.enable_mvcc
    }

    pub fn path(&self) -> &str {
        self.options.path.as_str()
    }

    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        tracing::debug!(sql, "execute batch");
        self.inner.execute_batch(sql).await.map_err(|e| query_error(e, sql, &[]))
    }

    // Transactions go through plain SQL; turso's transaction() handle panics
    // in 0.3 without an open read transaction.

    /// Start a transaction.
    ///
    /// With `only_if_none` set and a transaction already open this does
    /// nothing and returns `false`.
    pub async fn begin_transaction(&self, only_if_none: bool) -> Result<bool> {
        if only_if_none && self.has_active_transaction() {
            return Ok(false);
        }
        self.execute("BEGIN", Vec::new()).await?;
        self.in_transaction.store(true, Ordering::SeqCst);
        Ok(true)
    }

    pub async fn commit(&self) -> Result<()> {
        self.execute("COMMIT", Vec::new()).await?;
        self.in_transaction.store(false, Ordering::SeqCst);
        Ok(())
    }

    pub async fn rollback(&self) -> Result<()> {
        self.execute("ROLLBACK", Vec::new()).await?;
        self.in_transaction.store(false, Ordering::SeqCst);
        Ok(())
    }

    pub fn has_active_transaction(&self) -> bool {
        self.in_transaction.load(Ordering::SeqCst)
    }

    /// Check whether a table exists in the schema catalog.
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let sql = "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?";
        let columns = ["count".to_string()];
        let row = self.fetch_row(sql, vec![Value::Text(table.to_string())], &columns).await?;
        Ok(matches!(row.and_then(|mut r| r.remove("count")), Some(Value::Integer(count)) if count > 0))
    }
}

fn query_error(error: turso::Error, sql: &str, params: &[Value]) -> Error {
    Error::Query { message: error.to_string(), sql: sql.to_string(), params: params.to_vec() }
}

fn to_params(params: &[Value]) -> Vec<turso::Value> {
    params.iter().cloned().map(Value::into_sql).collect()
}

#[async_trait]
impl Executor for Connection {
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64> {
        tracing::debug!(sql, ?params, "execute");
        let affected = self.inner.execute(sql, to_params(&params)).await.map_err(|e| query_error(e, sql, &params))?;
        tracing::trace!(affected, "executed");
        Ok(affected)
    }

    async fn fetch_rows(&self, sql: &str, params: Vec<Value>, columns: &[String]) -> Result<Vec<RowData>> {
        tracing::debug!(sql, ?params, "query");
        let mut rows = self.inner.query(sql, to_params(&params)).await.map_err(|e| query_error(e, sql, &params))?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| query_error(e, sql, &params))? {
            let count = row.column_count().min(columns.len());
            let mut data = RowData::with_capacity(count);
            for (idx, column) in columns.iter().take(count).enumerate() {
                let value = row.get_value(idx).map_err(|e| query_error(e, sql, &params))?;
                data.insert(column.clone(), Value::from_sql(value));
            }
            results.push(data);
        }

        tracing::trace!(rows = results.len(), "fetched");
        Ok(results)
    }

    fn last_insert_id(&self) -> Option<i64> {
        let id = self.inner.last_insert_rowid();
        (id != 0).then_some(id)
    }
}
