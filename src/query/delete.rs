//! DELETE query builder

use crate::Condition;
use crate::Value;
use crate::query::push_where;
use crate::query::quote_identifier;

/// DELETE builder over one table
///
/// Without any filters it deletes every row.
#[derive(Clone, Debug)]
pub struct Delete {
    table:      String,
    conditions: Vec<Condition>,
}

impl Delete {
    pub fn new(table: &str) -> Self {
        Self { table: table.to_string(), conditions: Vec::new() }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn build(&self) -> (String, Vec<Value>) {
        let mut sql = format!("DELETE FROM {}", quote_identifier(&self.table));
        let mut params = Vec::new();
        push_where(&mut sql, &mut params, &self.conditions);
        (sql, params)
    }
}
