//! SQL builders for single-table statements

pub(crate) mod condition;
pub(crate) mod delete;
pub(crate) mod insert;
pub(crate) mod select;
pub(crate) mod update;

pub use condition::Condition;
pub use condition::Order;
pub use condition::OrderBy;
pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use update::Update;

/// Quote an identifier for SQLite, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn push_where(sql: &mut String, params: &mut Vec<crate::Value>, conditions: &[Condition]) {
    if conditions.is_empty() {
        return;
    }

    let where_parts: Vec<String> = if conditions.len() == 1 {
        vec![conditions[0].sql().to_string()]
    } else {
        conditions.iter().map(|c| format!("({})", c.sql())).collect()
    };
    sql.push_str(" WHERE ");
    sql.push_str(&where_parts.join(" AND "));

    for condition in conditions {
        params.extend(condition.values().iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
