//! Value types and conversions for rowtrack

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;

use crate::error::Error;
use crate::error::Result;

/// Storage format used for datetime values.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Strategy used to turn raw text into a datetime value.
pub type DateTimeParser = fn(&str) -> Option<NaiveDateTime>;

/// A single field value held by an entity
///
/// Unlike the storage engine's own value type this keeps booleans and
/// datetimes distinct, so coercion and dirty tracking compare like with like.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    DateTime(NaiveDateTime),
}

/// The declared type of a field
///
/// Maps onto SQLite's type affinity when generating DDL:
/// - `Integer` and `Boolean` map to INTEGER
/// - `Float` maps to REAL
/// - `String` and `DateTime` map to TEXT
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SemanticType {
    Integer,
    Float,
    Boolean,
    String,
    DateTime,
}

impl SemanticType {
    /// Value a field of this type holds when nothing else was supplied.
    pub fn zero_value(self) -> Value {
        match self {
            SemanticType::Integer => Value::Integer(0),
            SemanticType::Float => Value::Float(0.0),
            SemanticType::Boolean => Value::Boolean(false),
            SemanticType::String => Value::Text(String::new()),
            SemanticType::DateTime => Value::Null,
        }
    }

    pub fn sql_type(self) -> &'static str {
        match self {
            SemanticType::Integer | SemanticType::Boolean => "INTEGER",
            SemanticType::Float => "REAL",
            SemanticType::String | SemanticType::DateTime => "TEXT",
        }
    }

    /// Cast `raw` into this type.
    ///
    /// Numeric casts never fail: text contributes its leading number, or zero
    /// when it has none. Only datetimes can be rejected, and `property` is
    /// used for that error message. Null becomes the zero value of the type;
    /// callers that allow null must check before coercing.
    pub fn coerce(self, property: &str, raw: Value, parse: DateTimeParser) -> Result<Value> {
        let invalid = |value: &Value, reason: &str| Error::InvalidValue {
            property: property.to_string(),
            value:    value.to_text(),
            reason:   reason.to_string(),
        };

        let coerced = match (self, raw) {
            (_, Value::Null) => self.zero_value(),

            (SemanticType::Integer, Value::Integer(v)) => Value::Integer(v),
            (SemanticType::Integer, Value::Float(v)) => Value::Integer(v as i64),
            (SemanticType::Integer, Value::Boolean(v)) => Value::Integer(v as i64),
            (SemanticType::Integer, Value::DateTime(v)) => Value::Integer(v.and_utc().timestamp()),
            (SemanticType::Integer, Value::Text(s)) => {
                let prefix = numeric_prefix(&s);
                match prefix.parse::<i64>() {
                    Ok(v) => Value::Integer(v),
                    Err(_) => Value::Integer(prefix.parse::<f64>().map(|v| v as i64).unwrap_or(0)),
                }
            }

            (SemanticType::Float, Value::Integer(v)) => Value::Float(v as f64),
            (SemanticType::Float, Value::Float(v)) => Value::Float(v),
            (SemanticType::Float, Value::Boolean(v)) => Value::Float(if v { 1.0 } else { 0.0 }),
            (SemanticType::Float, Value::DateTime(v)) => Value::Float(v.and_utc().timestamp() as f64),
            (SemanticType::Float, Value::Text(s)) => Value::Float(numeric_prefix(&s).parse::<f64>().unwrap_or(0.0)),

            (SemanticType::Boolean, Value::Integer(v)) => Value::Boolean(v != 0),
            (SemanticType::Boolean, Value::Float(v)) => Value::Boolean(v != 0.0),
            (SemanticType::Boolean, Value::Boolean(v)) => Value::Boolean(v),
            (SemanticType::Boolean, Value::DateTime(_)) => Value::Boolean(true),
            (SemanticType::Boolean, Value::Text(s)) => Value::Boolean(!(s.is_empty() || s == "0")),

            (SemanticType::String, other) => Value::Text(other.to_text()),

            (SemanticType::DateTime, Value::DateTime(v)) => Value::DateTime(v),
            (SemanticType::DateTime, Value::Text(s)) => {
                if s.trim().is_empty() {
                    Value::Null
                } else {
                    match parse(s.trim()) {
                        Some(v) => Value::DateTime(v),
                        None => return Err(invalid(&Value::Text(s), "not a valid datetime")),
                    }
                }
            }
            (SemanticType::DateTime, Value::Integer(v)) => match DateTime::from_timestamp(v, 0) {
                Some(v) => Value::DateTime(v.naive_utc()),
                None => return Err(invalid(&Value::Integer(v), "timestamp out of range")),
            },
            (SemanticType::DateTime, Value::Float(v)) => match DateTime::from_timestamp(v as i64, 0) {
                Some(v) => Value::DateTime(v.naive_utc()),
                None => return Err(invalid(&Value::Float(v), "timestamp out of range")),
            },
            (SemanticType::DateTime, raw @ Value::Boolean(_)) => {
                return Err(invalid(&raw, "not a valid datetime"));
            }
        };

        Ok(coerced)
    }
}

/// Leading numeric part of `raw` after any whitespace, e.g. `"12kg"` gives
/// `"12"`. Empty when the text does not start with a number.
fn numeric_prefix(raw: &str) -> &str {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut at: usize| {
        while at < bytes.len() && bytes[at].is_ascii_digit() {
            at += 1;
        }
        at
    };

    let start = if matches!(bytes.first(), Some(b'+' | b'-')) { 1 } else { 0 };
    let mut end = digits_from(start);
    let mut has_digits = end > start;

    if bytes.get(end) == Some(&b'.') {
        let fraction_end = digits_from(end + 1);
        if has_digits || fraction_end > end + 1 {
            has_digits = true;
            end = fraction_end;
        }
    }
    if !has_digits {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = if matches!(bytes.get(end + 1), Some(b'+' | b'-')) { 1 } else { 0 };
        let exponent_end = digits_from(end + 1 + sign);
        if exponent_end > end + 1 + sign {
            end = exponent_end;
        }
    }

    &s[..end]
}

/// Default datetime strategy.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, the `T` separated form, fractional seconds,
/// RFC 3339 (converted to UTC) and bare dates (midnight).
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    for format in FORMATS {
        if let Ok(v) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(v);
        }
    }

    if let Ok(v) = DateTime::parse_from_rfc3339(raw) {
        return Some(v.naive_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null or the empty string.
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Not set for the `required` rule: null, false or the empty string.
    pub fn is_unset(&self) -> bool {
        self.is_absent() || matches!(self, Value::Boolean(false))
    }

    /// Falsy: null, zero, false or the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Integer(v) => *v == 0,
            Value::Float(v) => *v == 0.0,
            Value::Boolean(v) => !*v,
            Value::Text(s) => s.is_empty(),
            Value::DateTime(_) => false,
        }
    }

    /// Text rendering used for string coercion, length checks and composite keys.
    ///
    /// `true` renders as `1` and `false` as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Boolean(v) => (if *v { "1" } else { "" }).to_string(),
            Value::Text(s) => s.clone(),
            Value::DateTime(v) => v.format(DATETIME_FORMAT).to_string(),
        }
    }

    /// Convert into a bindable storage value.
    ///
    /// Booleans bind as 1/0 and datetimes as `YYYY-MM-DD HH:MM:SS` text.
    pub fn into_sql(self) -> turso::Value {
        match self {
            Value::Null => turso::Value::Null,
            Value::Integer(v) => turso::Value::Integer(v),
            Value::Float(v) => turso::Value::Real(v),
            Value::Boolean(v) => turso::Value::Integer(v as i64),
            Value::Text(s) => turso::Value::Text(s),
            Value::DateTime(v) => turso::Value::Text(v.format(DATETIME_FORMAT).to_string()),
        }
    }

    pub fn from_sql(value: turso::Value) -> Self {
        match value {
            turso::Value::Null => Value::Null,
            turso::Value::Integer(v) => Value::Integer(v),
            turso::Value::Real(v) => Value::Float(v),
            turso::Value::Text(s) => Value::Text(s),
            turso::Value::Blob(b) => Value::Text(String::from_utf8_lossy(&b).into_owned()),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(v) => write!(f, "{}", v),
            other => write!(f, "{}", other.to_text()),
        }
    }
}

/// Trait for converting Rust types into entity values
///
/// ```ignore
/// use rowtrack::IntoValue;
///
/// let value = 42i64.into_value();
/// let text = "hello".into_value();
/// ```
pub trait IntoValue {
    fn into_value(self) -> Value;
}

/// Trait for extracting Rust types out of entity values
pub trait FromValue: Sized {
    /// # Errors
    ///
    /// Returns an error if the value cannot be converted to this type,
    /// or if the value is null and this type is not nullable.
    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Integer(self as i64)
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    i64::from_value(value).map(|v| v as $ty)
                }
            }
        )*
    };
}

impl_integer!(i32, i16, i8, u32, u16, u8);

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Boolean(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::Text(self.clone())
    }
}

impl IntoValue for NaiveDateTime {
    fn into_value(self) -> Value {
        Value::DateTime(self)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(v) => Ok(v),
            Value::Float(v) => Ok(v as i64),
            Value::Boolean(v) => Ok(v as i64),
            Value::Null => Err(Error::UnexpectedNull),
            other => Err(Error::TypeConversion { expected: "Integer", actual: format!("{:?}", other) }),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Integer(v) => Ok(v as f64),
            Value::Null => Err(Error::UnexpectedNull),
            other => Err(Error::TypeConversion { expected: "Float", actual: format!("{:?}", other) }),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(v) => Ok(v),
            Value::Integer(v) => Ok(v != 0),
            Value::Null => Err(Error::UnexpectedNull),
            other => Err(Error::TypeConversion { expected: "Boolean", actual: format!("{:?}", other) }),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(v) => Ok(v),
            Value::Null => Err(Error::UnexpectedNull),
            other => Err(Error::TypeConversion { expected: "Text", actual: format!("{:?}", other) }),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Text(s) => {
                parse_datetime(&s).ok_or_else(|| Error::TypeConversion { expected: "DateTime", actual: format!("Text({})", s) })
            }
            Value::Null => Err(Error::UnexpectedNull),
            other => Err(Error::TypeConversion { expected: "DateTime", actual: format!("{:?}", other) }),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(raw: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT).unwrap()
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(SemanticType::Integer.zero_value(), Value::Integer(0));
        assert_eq!(SemanticType::Float.zero_value(), Value::Float(0.0));
        assert_eq!(SemanticType::Boolean.zero_value(), Value::Boolean(false));
        assert_eq!(SemanticType::String.zero_value(), Value::Text(String::new()));
        assert_eq!(SemanticType::DateTime.zero_value(), Value::Null);
    }

    #[test]
    fn test_coerce_integer() {
        let ty = SemanticType::Integer;
        assert_eq!(ty.coerce("n", Value::Text("42".into()), parse_datetime).unwrap(), Value::Integer(42));
        assert_eq!(ty.coerce("n", Value::Text(" 7 ".into()), parse_datetime).unwrap(), Value::Integer(7));
        assert_eq!(ty.coerce("n", Value::Text("3.9".into()), parse_datetime).unwrap(), Value::Integer(3));
        assert_eq!(ty.coerce("n", Value::Text(String::new()), parse_datetime).unwrap(), Value::Integer(0));
        assert_eq!(ty.coerce("n", Value::Boolean(true), parse_datetime).unwrap(), Value::Integer(1));
        assert_eq!(ty.coerce("n", Value::Null, parse_datetime).unwrap(), Value::Integer(0));
    }

    #[test]
    fn test_coerce_integer_takes_leading_number() {
        let ty = SemanticType::Integer;
        assert_eq!(ty.coerce("qty", Value::Text("12kg".into()), parse_datetime).unwrap(), Value::Integer(12));
        assert_eq!(ty.coerce("qty", Value::Text("-4 units".into()), parse_datetime).unwrap(), Value::Integer(-4));
        assert_eq!(ty.coerce("qty", Value::Text("1e3".into()), parse_datetime).unwrap(), Value::Integer(1000));
        assert_eq!(ty.coerce("qty", Value::Text("n/a".into()), parse_datetime).unwrap(), Value::Integer(0));
        assert_eq!(ty.coerce("qty", Value::Text("-".into()), parse_datetime).unwrap(), Value::Integer(0));
    }

    #[test]
    fn test_numeric_prefix() {
        assert_eq!(numeric_prefix("  42abc"), "42");
        assert_eq!(numeric_prefix("3.25.1"), "3.25");
        assert_eq!(numeric_prefix(".5x"), ".5");
        assert_eq!(numeric_prefix("7e"), "7");
        assert_eq!(numeric_prefix("2E-2!"), "2E-2");
        assert_eq!(numeric_prefix("+.e1"), "");
        assert_eq!(numeric_prefix("abc"), "");
    }

    #[test]
    fn test_coerce_float() {
        let ty = SemanticType::Float;
        assert_eq!(ty.coerce("f", Value::Integer(2), parse_datetime).unwrap(), Value::Float(2.0));
        assert_eq!(ty.coerce("f", Value::Text("1.5".into()), parse_datetime).unwrap(), Value::Float(1.5));
        assert_eq!(ty.coerce("f", Value::Text("2.5 kg".into()), parse_datetime).unwrap(), Value::Float(2.5));
        assert_eq!(ty.coerce("f", Value::Text("x1".into()), parse_datetime).unwrap(), Value::Float(0.0));
    }

    #[test]
    fn test_coerce_boolean() {
        let ty = SemanticType::Boolean;
        assert_eq!(ty.coerce("b", Value::Integer(1), parse_datetime).unwrap(), Value::Boolean(true));
        assert_eq!(ty.coerce("b", Value::Integer(0), parse_datetime).unwrap(), Value::Boolean(false));
        assert_eq!(ty.coerce("b", Value::Text("0".into()), parse_datetime).unwrap(), Value::Boolean(false));
        assert_eq!(ty.coerce("b", Value::Text(String::new()), parse_datetime).unwrap(), Value::Boolean(false));
        // Any other non-empty text is true, including "false"
        assert_eq!(ty.coerce("b", Value::Text("false".into()), parse_datetime).unwrap(), Value::Boolean(true));
        assert_eq!(ty.coerce("b", Value::Text("yes".into()), parse_datetime).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_coerce_string() {
        let ty = SemanticType::String;
        assert_eq!(ty.coerce("s", Value::Integer(12), parse_datetime).unwrap(), Value::Text("12".into()));
        assert_eq!(ty.coerce("s", Value::Float(2.0), parse_datetime).unwrap(), Value::Text("2".into()));
        assert_eq!(ty.coerce("s", Value::Boolean(true), parse_datetime).unwrap(), Value::Text("1".into()));
        assert_eq!(ty.coerce("s", Value::Boolean(false), parse_datetime).unwrap(), Value::Text(String::new()));
        assert_eq!(ty.coerce("s", Value::Null, parse_datetime).unwrap(), Value::Text(String::new()));
    }

    #[test]
    fn test_coerce_datetime() {
        let ty = SemanticType::DateTime;
        assert_eq!(
            ty.coerce("d", Value::Text("2024-03-01 10:20:30".into()), parse_datetime).unwrap(),
            Value::DateTime(dt("2024-03-01 10:20:30"))
        );
        assert_eq!(ty.coerce("d", Value::Integer(0), parse_datetime).unwrap(), Value::DateTime(dt("1970-01-01 00:00:00")));
        assert_eq!(ty.coerce("d", Value::Text(String::new()), parse_datetime).unwrap(), Value::Null);
    }

    #[test]
    fn test_coerce_datetime_invalid() {
        let err = SemanticType::DateTime.coerce("createdAt", Value::Text("not a date".into()), parse_datetime);
        assert!(matches!(err, Err(Error::InvalidValue { .. })));
    }

    #[test]
    fn test_coerce_datetime_uses_injected_strategy() {
        fn only_epoch(raw: &str) -> Option<NaiveDateTime> {
            if raw == "epoch" { DateTime::from_timestamp(0, 0).map(|d| d.naive_utc()) } else { None }
        }

        let ty = SemanticType::DateTime;
        assert_eq!(ty.coerce("d", Value::Text("epoch".into()), only_epoch).unwrap(), Value::DateTime(dt("1970-01-01 00:00:00")));
        assert!(ty.coerce("d", Value::Text("2024-03-01 10:20:30".into()), only_epoch).is_err());
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = dt("2024-03-01 10:20:30");
        assert_eq!(parse_datetime("2024-03-01 10:20:30"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01T10:20:30"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01 10:20:30.250").map(|d| d.format(DATETIME_FORMAT).to_string()), Some("2024-03-01 10:20:30".to_string()));
        assert_eq!(parse_datetime("2024-03-01T12:20:30+02:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01"), Some(dt("2024-03-01 00:00:00")));
        assert_eq!(parse_datetime("yesterday"), None);
    }

    #[test]
    fn test_emptiness() {
        assert!(Value::Null.is_empty());
        assert!(Value::Integer(0).is_empty());
        assert!(Value::Float(0.0).is_empty());
        assert!(Value::Boolean(false).is_empty());
        assert!(Value::Text(String::new()).is_empty());
        assert!(!Value::Text("0".into()).is_empty());
        assert!(!Value::Integer(3).is_empty());

        assert!(Value::Null.is_absent());
        assert!(Value::Text(String::new()).is_absent());
        assert!(!Value::Integer(0).is_absent());
        assert!(!Value::Boolean(false).is_absent());

        assert!(Value::Boolean(false).is_unset());
        assert!(Value::Null.is_unset());
        assert!(!Value::Integer(0).is_unset());
        assert!(!Value::Boolean(true).is_unset());
    }

    #[test]
    fn test_into_sql() {
        assert_eq!(Value::Boolean(true).into_sql(), turso::Value::Integer(1));
        assert_eq!(Value::DateTime(dt("2024-03-01 10:20:30")).into_sql(), turso::Value::Text("2024-03-01 10:20:30".into()));
        assert_eq!(Value::Float(1.5).into_sql(), turso::Value::Real(1.5));
        assert_eq!(Value::Null.into_sql(), turso::Value::Null);
    }

    #[test]
    fn test_from_sql() {
        assert_eq!(Value::from_sql(turso::Value::Real(2.5)), Value::Float(2.5));
        assert_eq!(Value::from_sql(turso::Value::Blob(b"abc".to_vec())), Value::Text("abc".into()));
        assert_eq!(Value::from_sql(turso::Value::Null), Value::Null);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::Text("abc".into()).to_string(), "abc");
        assert_eq!(Value::Integer(-3).to_string(), "-3");
    }

    #[test]
    fn test_into_value() {
        assert_eq!(42i64.into_value(), Value::Integer(42));
        assert_eq!(7i32.into_value(), Value::Integer(7));
        assert_eq!(2.5f64.into_value(), Value::Float(2.5));
        assert_eq!(true.into_value(), Value::Boolean(true));
        assert_eq!("hi".into_value(), Value::Text("hi".into()));
        assert_eq!(None::<i64>.into_value(), Value::Null);
        assert_eq!(Some(3u8).into_value(), Value::Integer(3));
    }

    #[test]
    fn test_from_value() {
        assert_eq!(i64::from_value(Value::Integer(9)).unwrap(), 9);
        assert_eq!(u8::from_value(Value::Integer(9)).unwrap(), 9);
        assert!(bool::from_value(Value::Boolean(true)).unwrap());
        assert_eq!(String::from_value(Value::Text("a".into())).unwrap(), "a");
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert!(matches!(i64::from_value(Value::Null), Err(Error::UnexpectedNull)));
        assert!(matches!(i64::from_value(Value::Text("x".into())), Err(Error::TypeConversion { .. })));
        assert_eq!(NaiveDateTime::from_value(Value::Text("2024-03-01 10:20:30".into())).unwrap(), dt("2024-03-01 10:20:30"));
    }
}
