use crate::Condition;
use crate::Error;
use crate::Result;
use crate::Value;
use crate::query::push_where;
use crate::query::quote_identifier;

/// UPDATE builder over one table
#[derive(Clone, Debug)]
pub struct Update {
    table:      String,
    sets:       Vec<(String, Value)>,
    conditions: Vec<Condition>,
}

impl Update {
    pub fn new(table: &str) -> Self {
        Self { table: table.to_string(), sets: Vec::new(), conditions: Vec::new() }
    }

    pub fn set(mut self, column: impl Into<String>, value: Value) -> Self {
        self.sets.push((column.into(), value));
        self
    }

    pub fn sets(mut self, sets: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.sets.extend(sets);
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn build(&self) -> Result<(String, Vec<Value>)> {
        if self.sets.is_empty() {
            return Err(Error::InvalidArgument("No columns to update".to_string()));
        }

        let set_parts: Vec<String> = self.sets.iter().map(|(c, _)| format!("{} = ?", quote_identifier(c))).collect();
        let mut params: Vec<Value> = self.sets.iter().map(|(_, v)| v.clone()).collect();

        let mut sql = format!("UPDATE {} SET {}", quote_identifier(&self.table), set_parts.join(", "));
        push_where(&mut sql, &mut params, &self.conditions);

        Ok((sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_build() {
        let (sql, params) = Update::new("users")
            .set("name", Value::Text("Bob".into()))
            .filter(Condition::eq("id", 1))
            .build()
            .unwrap();
        assert_eq!(sql, "UPDATE \"users\" SET \"name\" = ? WHERE \"id\" = ?");
        assert_eq!(params, vec![Value::Text("Bob".into()), Value::Integer(1)]);
    }

    #[test]
    fn test_update_composite_filter() {
        let (sql, params) = Update::new("pairs")
            .sets(vec![("label".to_string(), Value::Text("x".into()))])
            .filter(Condition::all([Condition::eq("id", 3), Condition::eq("second_id", 2)]))
            .build()
            .unwrap();
        assert_eq!(sql, "UPDATE \"pairs\" SET \"label\" = ? WHERE \"id\" = ? AND \"second_id\" = ?");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_update_without_columns() {
        let err = Update::new("users").filter(Condition::eq("id", 1)).build().unwrap_err();
        assert!(format!("{}", err).contains("No columns to update"));
    }
}
