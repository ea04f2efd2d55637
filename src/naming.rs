//! Property name <-> storage column name mapping

use convert_case::Case;
use convert_case::Casing;

/// `someName` -> `some_name`
pub fn column_name(property: &str) -> String {
    property.to_case(Case::Snake)
}

/// `some_name` -> `someName`
pub fn property_name(column: &str) -> String {
    column.to_case(Case::Camel)
}
