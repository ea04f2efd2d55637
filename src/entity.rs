//! Entity state and change tracking
//!
//! - [`EntityTrait`] ties a Rust type to its static [`EntitySchema`]
//! - [`ModelTrait`] converts between a typed struct and its [`Entity`]
//! - [`Entity`] holds one row's values plus modification state and flags
//!
//! The traits are normally implemented by `#[derive(Entity)]`.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::marker::PhantomData;

use chrono::NaiveDateTime;

use crate::error::Error;
use crate::error::Result;
use crate::executor::RowData;
use crate::schema::EntitySchema;
use crate::schema::PrimaryKey;
use crate::value::FromValue;
use crate::value::IntoValue;
use crate::value::Value;

/// Trait for types that describe a stored entity
///
/// ```ignore
/// static FIELDS: [FieldDef; 2] = [
///     FieldDef::new("id", SemanticType::Integer),
///     FieldDef::new("name", SemanticType::String).with_max_length(50).required(),
/// ];
/// static SCHEMA: EntitySchema = EntitySchema::new("users", &FIELDS, PrimaryKey::Single("id"));
///
/// struct User;
///
/// impl EntityTrait for User {
///     fn schema() -> &'static EntitySchema {
///         &SCHEMA
///     }
/// }
/// ```
pub trait EntityTrait: Sized + Send + Sync + 'static {
    fn schema() -> &'static EntitySchema;

    /// Strategy for turning raw text into datetime values.
    fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
        crate::value::parse_datetime(raw)
    }
}

/// Trait for typed structs that mirror an entity's fields
pub trait ModelTrait: EntityTrait {
    fn from_entity(entity: &Entity<Self>) -> Result<Self>;

    fn into_entity(self) -> Result<Entity<Self>>;
}

/// Primary key value, shaped like the schema's key
#[derive(Clone, Debug, PartialEq)]
pub enum PrimaryValue {
    Single(Value),
    Composite(Vec<Value>),
}

impl PrimaryValue {
    pub fn single(value: impl IntoValue) -> Self {
        PrimaryValue::Single(value.into_value())
    }

    pub fn composite<V: IntoValue>(values: impl IntoIterator<Item = V>) -> Self {
        PrimaryValue::Composite(values.into_iter().map(IntoValue::into_value).collect())
    }

    /// A single key is present when it is not empty; a composite key when
    /// any of its parts is.
    pub fn is_present(&self) -> bool {
        match self {
            PrimaryValue::Single(value) => !value.is_empty(),
            PrimaryValue::Composite(values) => values.iter().any(|v| !v.is_empty()),
        }
    }

    pub fn values(&self) -> &[Value] {
        match self {
            PrimaryValue::Single(value) => std::slice::from_ref(value),
            PrimaryValue::Composite(values) => values,
        }
    }

    pub fn into_values(self) -> Vec<Value> {
        match self {
            PrimaryValue::Single(value) => vec![value],
            PrimaryValue::Composite(values) => values,
        }
    }
}

impl std::fmt::Display for PrimaryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimaryValue::Single(value) => write!(f, "{}", value),
            PrimaryValue::Composite(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Captured entity state, detached from any entity type
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitySnapshot {
    pub table:          String,
    pub values:         BTreeMap<String, Value>,
    pub modified:       Vec<String>,
    pub delete_on_save: bool,
    pub force_insert:   bool,
    pub deleted:        bool,
}

#[cfg(feature = "serde")]
impl EntitySnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One in-memory row of entity type `E`
///
/// Every declared field always holds a value. Changes made through the
/// setters are tracked until the entity is saved, loaded or cleared.
pub struct Entity<E: EntityTrait> {
    values:         Vec<Value>,
    modified:       BTreeSet<usize>,
    delete_on_save: bool,
    force_insert:   bool,
    deleted:        bool,
    _entity:        PhantomData<fn() -> E>,
}

impl<E: EntityTrait> Clone for Entity<E> {
    fn clone(&self) -> Self {
        Self {
            values:         self.values.clone(),
            modified:       self.modified.clone(),
            delete_on_save: self.delete_on_save,
            force_insert:   self.force_insert,
            deleted:        self.deleted,
            _entity:        PhantomData,
        }
    }
}

impl<E: EntityTrait> std::fmt::Debug for Entity<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("table", &E::schema().table_name())
            .field("values", &self.data())
            .field("modified", &self.modified_fields())
            .field("delete_on_save", &self.delete_on_save)
            .field("force_insert", &self.force_insert)
            .field("deleted", &self.deleted)
            .finish()
    }
}

impl<E: EntityTrait> Entity<E> {
    /// Create an entity holding the schema defaults.
    ///
    /// # Errors
    ///
    /// Returns a logic error if the schema of `E` is misconfigured.
    pub fn new() -> Result<Self> {
        let values = E::schema().default_values()?.to_vec();
        Ok(Self {
            values,
            modified: BTreeSet::new(),
            delete_on_save: false,
            force_insert: false,
            deleted: false,
            _entity: PhantomData,
        })
    }

    pub fn with_primary_value(primary_value: PrimaryValue) -> Result<Self> {
        let mut entity = Self::new()?;
        entity.set_primary_value(primary_value)?;
        Ok(entity)
    }

    pub fn from_row(row: &RowData) -> Result<Self> {
        let mut entity = Self::new()?;
        entity.load_from_row(row)?;
        Ok(entity)
    }

    pub fn schema() -> &'static EntitySchema {
        E::schema()
    }

    pub fn get(&self, property: &str) -> Result<&Value> {
        let idx = E::schema().field_index(property)?;
        Ok(&self.values[idx])
    }

    pub fn get_as<T: FromValue>(&self, property: &str) -> Result<T> {
        T::from_value(self.get(property)?.clone())
    }

    /// Set a property and mark it modified if the value changed.
    pub fn set(&mut self, property: &str, value: impl IntoValue) -> Result<()> {
        self.set_value(property, value.into_value(), true, false)
    }

    /// Set a property and mark it modified even if the value is unchanged.
    pub fn force_set(&mut self, property: &str, value: impl IntoValue) -> Result<()> {
        self.set_value(property, value.into_value(), true, true)
    }

    /// Coerce and store `raw` for `property`.
    ///
    /// Fields with a null default take null for null or empty text without
    /// coercion. The stored value and modification state are left untouched
    /// when the coerced value equals the current one, unless `force` is set.
    pub fn set_value(&mut self, property: &str, raw: Value, mark_modified: bool, force: bool) -> Result<()> {
        let idx = E::schema().field_index(property)?;
        self.set_at(idx, raw, mark_modified, force)
    }

    fn set_at(&mut self, idx: usize, raw: Value, mark_modified: bool, force: bool) -> Result<()> {
        let value = Self::coerce_at(idx, raw)?;
        self.store_at(idx, value, mark_modified, force);
        Ok(())
    }

    fn coerce_at(idx: usize, raw: Value) -> Result<Value> {
        let field = &E::schema().fields()[idx];
        if field.allows_null() && raw.is_absent() {
            Ok(Value::Null)
        } else {
            field.semantic_type().coerce(field.name(), raw, E::parse_datetime)
        }
    }

    fn store_at(&mut self, idx: usize, value: Value, mark_modified: bool, force: bool) {
        let field = &E::schema().fields()[idx];
        if force || value != self.values[idx] {
            tracing::trace!(table = E::schema().table_name(), field = field.name(), ?value, "set field");
            self.values[idx] = value;
            if mark_modified {
                self.modified.insert(idx);
            }
        }
    }

    /// Set several properties by name, marking them modified.
    pub fn set_data<'a>(&mut self, data: impl IntoIterator<Item = (&'a str, Value)>) -> Result<()> {
        for (property, value) in data {
            self.set_value(property, value, true, false)?;
        }
        Ok(())
    }

    /// Load storage columns into the entity without marking anything modified.
    ///
    /// Columns the schema does not declare are ignored. Every column is
    /// coerced before any is stored, so a failure leaves the entity untouched.
    pub fn load_from_row(&mut self, row: &RowData) -> Result<()> {
        let columns = E::schema().columns()?;
        let loaded = columns
            .iter()
            .enumerate()
            .filter_map(|(idx, column)| row.get(column).map(|raw| (idx, raw)))
            .map(|(idx, raw)| Ok((idx, Self::coerce_at(idx, raw.clone())?)))
            .collect::<Result<Vec<_>>>()?;

        for (idx, value) in loaded {
            self.store_at(idx, value, false, false);
        }
        Ok(())
    }

    /// Property values in declaration order.
    pub fn data(&self) -> Vec<(&'static str, Value)> {
        E::schema().fields().iter().zip(&self.values).map(|(f, v)| (f.name(), v.clone())).collect()
    }

    /// Values keyed by storage column.
    pub fn to_row(&self) -> Result<RowData> {
        let columns = E::schema().columns()?;
        Ok(columns.iter().cloned().zip(self.values.iter().cloned()).collect())
    }

    pub fn data_without_primary(&self) -> Result<Vec<(&'static str, Value)>> {
        let primary = E::schema().primary_indexes()?;
        Ok(self
            .data()
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| !primary.contains(idx))
            .map(|(_, pair)| pair)
            .collect())
    }

    /// Modified properties with their current values, in declaration order.
    pub fn modified_data(&self) -> Vec<(&'static str, Value)> {
        let fields = E::schema().fields();
        self.modified.iter().map(|&idx| (fields[idx].name(), self.values[idx].clone())).collect()
    }

    pub fn modified_fields(&self) -> Vec<&'static str> {
        let fields = E::schema().fields();
        self.modified.iter().map(|&idx| fields[idx].name()).collect()
    }

    pub(crate) fn modified_indexes(&self) -> &BTreeSet<usize> {
        &self.modified
    }

    pub(crate) fn value_at(&self, idx: usize) -> &Value {
        &self.values[idx]
    }

    pub fn has_modified(&self) -> bool {
        !self.modified.is_empty()
    }

    pub fn is_modified(&self, property: &str) -> Result<bool> {
        let idx = E::schema().field_index(property)?;
        Ok(self.modified.contains(&idx))
    }

    pub fn clear_modified_field(&mut self, property: &str) -> Result<()> {
        let idx = E::schema().field_index(property)?;
        self.modified.remove(&idx);
        Ok(())
    }

    pub fn clear_modified(&mut self) {
        self.modified.clear();
    }

    pub fn mark_all_modified(&mut self) {
        self.modified = (0..self.values.len()).collect();
    }

    pub fn primary_value(&self) -> Result<PrimaryValue> {
        let schema = E::schema();
        let indexes = schema.primary_indexes()?;
        Ok(match schema.primary_key() {
            PrimaryKey::Single(_) => PrimaryValue::Single(self.values[indexes[0]].clone()),
            PrimaryKey::Composite(_) => {
                PrimaryValue::Composite(indexes.iter().map(|&idx| self.values[idx].clone()).collect())
            }
        })
    }

    /// Set the primary key value without marking it modified.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if the shape does not match the key.
    pub fn set_primary_value(&mut self, primary_value: PrimaryValue) -> Result<()> {
        let schema = E::schema();
        let indexes = schema.primary_indexes()?;

        let values = match (schema.primary_key(), primary_value) {
            (PrimaryKey::Single(_), PrimaryValue::Single(value)) => vec![value],
            (PrimaryKey::Composite(keys), PrimaryValue::Composite(values)) if keys.len() == values.len() => values,
            (PrimaryKey::Composite(keys), PrimaryValue::Composite(values)) => {
                return Err(Error::InvalidArgument(format!(
                    "primary key of \"{}\" has {} fields, got {} values",
                    schema.table_name(),
                    keys.len(),
                    values.len()
                )));
            }
            (PrimaryKey::Composite(_), PrimaryValue::Single(_)) => {
                return Err(Error::InvalidArgument(format!(
                    "primary key of \"{}\" is composite and needs a list of values",
                    schema.table_name()
                )));
            }
            (PrimaryKey::Single(_), PrimaryValue::Composite(_)) => {
                return Err(Error::InvalidArgument(format!(
                    "primary key of \"{}\" is a single field",
                    schema.table_name()
                )));
            }
        };

        for (&idx, value) in indexes.iter().zip(values) {
            self.set_at(idx, value, false, false)?;
        }
        Ok(())
    }

    pub fn has_primary_value(&self) -> Result<bool> {
        Ok(self.primary_value()?.is_present())
    }

    /// Whether the single-field primary key is still empty.
    ///
    /// # Errors
    ///
    /// Composite keys have no reliable unset state and return a logic error;
    /// use [`Entity::set_force_insert`] for them instead.
    pub fn is_new(&self) -> Result<bool> {
        let schema = E::schema();
        if schema.primary_key().is_composite() {
            return Err(Error::Logic(format!(
                "cannot tell whether \"{}\" is new with a composite primary key, force insert instead",
                schema.table_name()
            )));
        }
        Ok(!self.has_primary_value()?)
    }

    pub fn should_insert_on_save(&self) -> Result<bool> {
        if self.force_insert {
            return Ok(true);
        }
        if E::schema().primary_key().is_composite() {
            return Ok(false);
        }
        self.is_new()
    }

    pub fn set_delete_on_save(&mut self, delete_on_save: bool) {
        self.delete_on_save = delete_on_save;
    }

    pub fn should_delete_on_save(&self) -> bool {
        self.delete_on_save
    }

    pub fn set_force_insert(&mut self, force_insert: bool) {
        self.force_insert = force_insert;
    }

    pub fn should_force_insert(&self) -> bool {
        self.force_insert
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    /// Apply the other entity's modified values to this one.
    pub fn merge_with(&mut self, other: &Entity<E>) -> Result<()> {
        self.set_data(other.modified_data())
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            table:          E::schema().table_name().to_string(),
            values:         self.data().into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            modified:       self.modified_fields().into_iter().map(str::to_string).collect(),
            delete_on_save: self.delete_on_save,
            force_insert:   self.force_insert,
            deleted:        self.deleted,
        }
    }

    /// Rebuild an entity from a snapshot of the same table.
    ///
    /// Properties missing from the snapshot keep their defaults.
    pub fn restore(snapshot: EntitySnapshot) -> Result<Self> {
        let schema = E::schema();
        if snapshot.table != schema.table_name() {
            return Err(Error::InvalidArgument(format!(
                "snapshot of \"{}\" cannot be restored as \"{}\"",
                snapshot.table,
                schema.table_name()
            )));
        }

        let mut entity = Self::new()?;
        for (property, value) in snapshot.values {
            entity.set_value(&property, value, false, true)?;
        }
        for property in &snapshot.modified {
            let idx = schema.field_index(property)?;
            entity.modified.insert(idx);
        }
        entity.delete_on_save = snapshot.delete_on_save;
        entity.force_insert = snapshot.force_insert;
        entity.deleted = snapshot.deleted;
        Ok(entity)
    }
}
