//! Static field declarations for entity types

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::error::Error;
use crate::error::Result;
use crate::error::ValidationFailure;
use crate::naming;
use crate::query::quote_identifier;
use crate::value::SemanticType;
use crate::value::Value;
use crate::value::parse_datetime;

/// Declared default of a field
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DefaultValue {
    /// The zero value of the field's type.
    Zero,
    /// Null; also permits the field to hold null later on.
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(&'static str),
}

impl DefaultValue {
    fn raw(self, semantic_type: SemanticType) -> Value {
        match self {
            DefaultValue::Zero => semantic_type.zero_value(),
            DefaultValue::Null => Value::Null,
            DefaultValue::Integer(v) => Value::Integer(v),
            DefaultValue::Float(v) => Value::Float(v),
            DefaultValue::Boolean(v) => Value::Boolean(v),
            DefaultValue::Text(v) => Value::Text(v.to_string()),
        }
    }
}

/// Declaration of a single entity property
///
/// Built with `const` builder methods so whole schemas can live in statics:
///
/// ```ignore
/// const NAME: FieldDef = FieldDef::new("name", SemanticType::String).with_max_length(5).required();
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FieldDef {
    name:          &'static str,
    semantic_type: SemanticType,
    default:       DefaultValue,
    max_length:    Option<usize>,
    required:      bool,
    non_empty:     bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, semantic_type: SemanticType) -> Self {
        Self { name, semantic_type, default: DefaultValue::Zero, max_length: None, required: false, non_empty: false }
    }

    pub const fn with_default(self, default: DefaultValue) -> Self {
        Self { default, ..self }
    }

    pub const fn nullable(self) -> Self {
        self.with_default(DefaultValue::Null)
    }

    pub const fn with_max_length(self, max_length: usize) -> Self {
        Self { max_length: Some(max_length), ..self }
    }

    pub const fn required(self) -> Self {
        Self { required: true, ..self }
    }

    pub const fn non_empty(self) -> Self {
        Self { non_empty: true, ..self }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn semantic_type(&self) -> SemanticType {
        self.semantic_type
    }

    pub fn default_value(&self) -> DefaultValue {
        self.default
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_non_empty(&self) -> bool {
        self.non_empty
    }

    /// Null is permitted when the default is null, either declared or as
    /// the zero value of a datetime.
    pub fn allows_null(&self) -> bool {
        match self.default {
            DefaultValue::Null => true,
            DefaultValue::Zero => self.semantic_type.zero_value().is_null(),
            _ => false,
        }
    }

    /// Check a value about to be written.
    ///
    /// Rules apply in order and the first failure wins: max length (only for
    /// non-empty scalar values, never datetimes), then non-empty, then required.
    pub fn validate(&self, value: &Value) -> Result<()> {
        let measured = !value.is_absent() && !matches!(value, Value::DateTime(_));
        let failure = if let Some(max_length) = self.max_length.filter(|_| measured) {
            let text = value.to_text();
            let length = text.chars().count();
            (length > max_length).then_some(ValidationFailure::MaxLength { max_length, length, value: text })
        } else {
            None
        };

        let failure = failure
            .or_else(|| (self.non_empty && value.is_empty()).then_some(ValidationFailure::Empty))
            .or_else(|| (self.required && value.is_unset()).then_some(ValidationFailure::Required));

        match failure {
            Some(failure) => Err(Error::Validation { property: self.name.to_string(), failure }),
            None => Ok(()),
        }
    }
}

/// Primary key declaration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimaryKey {
    Single(&'static str),
    Composite(&'static [&'static str]),
}

impl PrimaryKey {
    pub fn properties(&self) -> &[&'static str] {
        match self {
            PrimaryKey::Single(name) => std::slice::from_ref(name),
            PrimaryKey::Composite(names) => *names,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, PrimaryKey::Composite(_))
    }
}

#[derive(Debug)]
struct Derived {
    columns:         Vec<String>,
    defaults:        Vec<Value>,
    by_property:     HashMap<&'static str, usize>,
    by_column:       HashMap<String, usize>,
    primary_indexes: Vec<usize>,
}

/// Static description of an entity type: table, fields and primary key
///
/// Lookup tables (column names, coerced defaults, indexes) are computed on
/// first use and shared for the lifetime of the schema.
#[derive(Debug)]
pub struct EntitySchema {
    table:       &'static str,
    fields:      &'static [FieldDef],
    primary_key: PrimaryKey,
    derived:     OnceLock<std::result::Result<Derived, String>>,
}

impl EntitySchema {
    pub const fn new(table: &'static str, fields: &'static [FieldDef], primary_key: PrimaryKey) -> Self {
        Self { table, fields, primary_key, derived: OnceLock::new() }
    }

    pub fn table_name(&self) -> &'static str {
        self.table
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    pub fn primary_key(&self) -> PrimaryKey {
        self.primary_key
    }

    /// Fails with a logic error when the declaration is unusable.
    pub fn check(&self) -> Result<()> {
        self.derived().map(|_| ())
    }

    fn derived(&self) -> Result<&Derived> {
        self.derived.get_or_init(|| self.derive()).as_ref().map_err(|message| Error::Logic(message.clone()))
    }

    fn derive(&self) -> std::result::Result<Derived, String> {
        if self.table.is_empty() {
            return Err("entity table name is not defined".to_string());
        }
        if self.fields.is_empty() {
            return Err(format!("entity \"{}\" declares no fields", self.table));
        }

        let mut columns = Vec::with_capacity(self.fields.len());
        let mut defaults = Vec::with_capacity(self.fields.len());
        let mut by_property = HashMap::new();
        let mut by_column = HashMap::new();

        for (idx, field) in self.fields.iter().enumerate() {
            if by_property.insert(field.name, idx).is_some() {
                return Err(format!("field \"{}\" is declared twice in \"{}\"", field.name, self.table));
            }

            let column = naming::column_name(field.name);
            if by_column.insert(column.clone(), idx).is_some() {
                return Err(format!("column \"{}\" is mapped twice in \"{}\"", column, self.table));
            }
            columns.push(column);

            let raw = field.default.raw(field.semantic_type);
            let default = if raw.is_null() {
                Value::Null
            } else {
                field.semantic_type.coerce(field.name, raw, parse_datetime).map_err(|e| {
                    format!("default of field \"{}\" in \"{}\" is invalid: {}", field.name, self.table, e)
                })?
            };
            defaults.push(default);
        }

        let properties = self.primary_key.properties();
        if properties.is_empty() {
            return Err(format!("primary key of \"{}\" is empty", self.table));
        }

        let mut seen = HashSet::new();
        let mut primary_indexes = Vec::with_capacity(properties.len());
        for property in properties {
            let idx = by_property
                .get(property)
                .copied()
                .ok_or_else(|| format!("primary key field \"{}\" is not declared in \"{}\"", property, self.table))?;
            if !seen.insert(idx) {
                return Err(format!("primary key field \"{}\" is listed twice in \"{}\"", property, self.table));
            }
            primary_indexes.push(idx);
        }

        Ok(Derived { columns, defaults, by_property, by_column, primary_indexes })
    }

    pub fn field_index(&self, property: &str) -> Result<usize> {
        self.derived()?
            .by_property
            .get(property)
            .copied()
            .ok_or_else(|| Error::InvalidField { table: self.table, property: property.to_string() })
    }

    pub fn field(&self, property: &str) -> Result<&'static FieldDef> {
        let fields = self.fields;
        Ok(&fields[self.field_index(property)?])
    }

    pub fn column_index(&self, column: &str) -> Result<Option<usize>> {
        Ok(self.derived()?.by_column.get(column).copied())
    }

    pub fn column_name(&self, property: &str) -> Result<&str> {
        let idx = self.field_index(property)?;
        Ok(self.derived()?.columns[idx].as_str())
    }

    /// Storage columns in declaration order.
    pub fn columns(&self) -> Result<&[String]> {
        Ok(&self.derived()?.columns)
    }

    /// Coerced defaults in declaration order.
    pub fn default_values(&self) -> Result<&[Value]> {
        Ok(&self.derived()?.defaults)
    }

    /// Field indexes of the primary key, in key order.
    pub fn primary_indexes(&self) -> Result<&[usize]> {
        Ok(&self.derived()?.primary_indexes)
    }

    pub fn primary_columns(&self) -> Result<Vec<String>> {
        let derived = self.derived()?;
        Ok(derived.primary_indexes.iter().map(|&idx| derived.columns[idx].clone()).collect())
    }

    pub fn property_names(&self, exclude: &[&str]) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).filter(|name| !exclude.contains(name)).collect()
    }

    pub fn column_names(&self, exclude: &[&str]) -> Result<Vec<String>> {
        let derived = self.derived()?;
        Ok(self
            .fields
            .iter()
            .zip(&derived.columns)
            .filter(|(field, _)| !exclude.contains(&field.name))
            .map(|(_, column)| column.clone())
            .collect())
    }

    /// Columns qualified with a table alias: `t.some_name`.
    pub fn prefixed_column_names(&self, alias: &str) -> Result<Vec<String>> {
        Ok(self.columns()?.iter().map(|column| format!("{}.{}", alias, column)).collect())
    }

    /// Columns qualified and aliased for joins: `t.some_name AS t_some_name`.
    pub fn aliased_column_names(&self, alias: &str) -> Result<Vec<String>> {
        Ok(self.columns()?.iter().map(|column| format!("{alias}.{column} AS {alias}_{column}")).collect())
    }

    /// Generate the CREATE TABLE statement for this entity.
    pub fn create_table_sql(&self, if_not_exists: bool) -> Result<String> {
        let derived = self.derived()?;
        let exists_clause = if if_not_exists { "IF NOT EXISTS " } else { "" };

        let auto_increment = match self.primary_key {
            PrimaryKey::Single(_) => {
                let idx = derived.primary_indexes[0];
                (self.fields[idx].semantic_type == SemanticType::Integer).then_some(idx)
            }
            PrimaryKey::Composite(_) => None,
        };

        let mut column_defs = Vec::with_capacity(self.fields.len() + 1);
        for (idx, field) in self.fields.iter().enumerate() {
            let mut def =
                format!("{} {}", quote_identifier(&derived.columns[idx]), field.semantic_type.sql_type());

            if auto_increment == Some(idx) {
                def.push_str(" PRIMARY KEY AUTOINCREMENT");
                column_defs.push(def);
                continue;
            }

            if !field.allows_null() {
                def.push_str(" NOT NULL");
            }

            if let Some(literal) = default_literal(&derived.defaults[idx]) {
                def.push_str(&format!(" DEFAULT {}", literal));
            }

            column_defs.push(def);
        }

        if auto_increment.is_none() {
            let primary: Vec<String> =
                derived.primary_indexes.iter().map(|&idx| quote_identifier(&derived.columns[idx])).collect();
            column_defs.push(format!("PRIMARY KEY ({})", primary.join(", ")));
        }

        Ok(format!("CREATE TABLE {}{} (\n  {}\n)", exists_clause, quote_identifier(self.table), column_defs.join(",\n  ")))
    }

    pub fn drop_table_sql(&self, if_exists: bool) -> String {
        let exists_clause = if if_exists { "IF EXISTS " } else { "" };
        format!("DROP TABLE {}{}", exists_clause, quote_identifier(self.table))
    }
}

fn default_literal(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(v) => Some(v.to_string()),
        Value::Float(v) => Some(format!("{:?}", v)),
        Value::Boolean(v) => Some(if *v { "1" } else { "0" }.to_string()),
        Value::Text(s) => Some(format!("'{}'", s.replace('\'', "''"))),
        Value::DateTime(v) => Some(format!("'{}'", v.format(crate::value::DATETIME_FORMAT))),
    }
}
