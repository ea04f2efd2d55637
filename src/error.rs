use thiserror::Error;

use crate::value::Value;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a field value was rejected before a write.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationFailure {
    MaxLength { max_length: usize, length: usize, value: String },
    Empty,
    Required,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationFailure::MaxLength { max_length, length, value } => {
                write!(f, "exceeds field max length of {} with {} characters (value: \"{}\")", max_length, length, value)
            }
            ValidationFailure::Empty => write!(f, "is empty and required"),
            ValidationFailure::Required => write!(f, "is required to be set"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),

    #[error("Query error: {message} [SQL: {sql}] [Parameters: {}]", render_params(.params))]
    Query { message: String, sql: String, params: Vec<Value> },

    #[error("Invalid field \"{property}\" for table \"{table}\"")]
    InvalidField { table: &'static str, property: String },

    #[error("Invalid value for field \"{property}\": {reason} (value: \"{value}\")")]
    InvalidValue { property: String, value: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Logic error: {0}")]
    Logic(String),

    #[error("Entity not found in table \"{table}\" for primary value {primary_value}")]
    EntityNotFound { table: &'static str, primary_value: String },

    #[error("Database field \"{property}\" {failure}")]
    Validation { property: String, failure: ValidationFailure },

    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversion { expected: &'static str, actual: String },

    #[error("Unexpected null value for non-nullable field")]
    UnexpectedNull,

    #[error("Migration error: {0}")]
    Migration(String),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn render_params(params: &[Value]) -> String {
    params.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
}
