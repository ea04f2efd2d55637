use crate::Value;
use crate::query::quote_identifier;

/// INSERT builder for a single row
#[derive(Clone, Debug)]
pub struct Insert {
    table:  String,
    values: Vec<(String, Value)>,
}

impl Insert {
    pub fn new(table: &str) -> Self {
        Self { table: table.to_string(), values: Vec::new() }
    }

    pub fn value(mut self, column: impl Into<String>, value: Value) -> Self {
        self.values.push((column.into(), value));
        self
    }

    pub fn values(mut self, values: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.values.extend(values);
        self
    }

    pub fn build(&self) -> (String, Vec<Value>) {
        if self.values.is_empty() {
            return (format!("INSERT INTO {} DEFAULT VALUES", quote_identifier(&self.table)), Vec::new());
        }

        let columns: Vec<String> = self.values.iter().map(|(c, _)| quote_identifier(c)).collect();
        let placeholders: Vec<&str> = self.values.iter().map(|_| "?").collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(&self.table),
            columns.join(", "),
            placeholders.join(", ")
        );

        (sql, self.values.iter().map(|(_, v)| v.clone()).collect())
    }
}
