//! Building entity collections from fetched rows

use std::collections::HashMap;
use std::marker::PhantomData;

use crate::Condition;
use crate::OrderBy;
use crate::entity::Entity;
use crate::entity::EntityTrait;
use crate::error::Error;
use crate::error::Result;
use crate::executor::Executor;
use crate::executor::RowData;
use crate::query::Select;
use crate::value::Value;

/// Separator between the parts of a composite key.
pub const KEY_SEPARATOR: &str = "-";

/// Entities keyed by their collection key, in first-seen order
pub struct EntityCollection<E: EntityTrait> {
    entries: Vec<(String, Entity<E>)>,
    index:   HashMap<String, usize>,
}

impl<E: EntityTrait> EntityCollection<E> {
    pub fn new() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Entity<E>> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entity<E>> {
        self.index.get(key).map(|&idx| &mut self.entries[idx].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity<E>)> {
        self.entries.iter().map(|(key, entity)| (key.as_str(), entity))
    }

    pub fn into_entities(self) -> Vec<Entity<E>> {
        self.entries.into_iter().map(|(_, entity)| entity).collect()
    }

    /// Insert a new entity or merge the row into the one already held.
    fn absorb(&mut self, key: String, row: &RowData) -> Result<()> {
        match self.index.get(&key).copied() {
            Some(idx) => self.entries[idx].1.load_from_row(row),
            None => {
                let entity = Entity::from_row(row)?;
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, entity));
                Ok(())
            }
        }
    }
}

impl<E: EntityTrait> Default for EntityCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> std::fmt::Debug for EntityCollection<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter().map(|(k, v)| (k, v))).finish()
    }
}

impl<E: EntityTrait> IntoIterator for EntityCollection<E> {
    type IntoIter = std::vec::IntoIter<(String, Entity<E>)>;
    type Item = (String, Entity<E>);

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Group rows into entities by key.
///
/// The key is the column of `key_property` when given, otherwise the primary
/// key column(s) joined with [`KEY_SEPARATOR`]. Later rows with a key already
/// seen are loaded into the existing entity, so the last row wins per column.
pub fn entities_from_rows<E: EntityTrait>(
    rows: impl IntoIterator<Item = RowData>,
    key_property: Option<&str>,
) -> Result<EntityCollection<E>> {
    let schema = E::schema();
    schema.check()?;

    let key_columns = match key_property {
        Some(property) => vec![schema.column_name(property)?.to_string()],
        None => schema.primary_columns()?,
    };

    let mut collection = EntityCollection::new();
    for row in rows {
        let mut parts = Vec::with_capacity(key_columns.len());
        for column in &key_columns {
            let value = row.get(column).ok_or_else(|| {
                Error::InvalidArgument(format!("row has no key column \"{}\" for \"{}\"", column, schema.table_name()))
            })?;
            parts.push(value.to_text());
        }
        collection.absorb(parts.join(KEY_SEPARATOR), &row)?;
    }

    Ok(collection)
}

/// Build one entity, or nothing for a missing or empty row.
pub fn entity_from_row<E: EntityTrait>(row: Option<RowData>) -> Result<Option<Entity<E>>> {
    match row {
        Some(row) if !row.is_empty() => Entity::from_row(&row).map(Some),
        _ => Ok(None),
    }
}

/// One page of results, numbered from 1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    number:   usize,
    per_page: usize,
}

impl Page {
    pub fn new(number: usize, per_page: usize) -> Result<Self> {
        if number < 1 {
            return Err(Error::InvalidArgument(format!("page number must be 1 or greater, got {}", number)));
        }
        if per_page < 1 {
            return Err(Error::InvalidArgument(format!("page size must be 1 or greater, got {}", per_page)));
        }
        Ok(Self { number, per_page })
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn offset(&self) -> usize {
        (self.number - 1) * self.per_page
    }
}

/// Fetches entities of type `E` from their table
pub struct EntityFetcher<'a, E: EntityTrait, X: Executor + ?Sized> {
    db:      &'a X,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E: EntityTrait, X: Executor + ?Sized> EntityFetcher<'a, E, X> {
    pub fn new(db: &'a X) -> Self {
        Self { db, _entity: PhantomData }
    }

    fn select(filter: Option<Condition>) -> Result<Select> {
        let schema = E::schema();
        let mut select = Select::new(schema.table_name(), schema.columns()?.to_vec());
        if let Some(filter) = filter {
            select = select.filter(filter);
        }
        Ok(select)
    }

    /// Fetch matching entities ordered by primary key.
    pub async fn fetch_all(&self, filter: Option<Condition>, page: Option<Page>) -> Result<EntityCollection<E>> {
        let schema = E::schema();
        let mut select = Self::select(filter)?;
        for column in schema.primary_columns()? {
            select = select.order_by(OrderBy::asc(&column));
        }
        if let Some(page) = page {
            select = select.limit(page.per_page()).offset(page.offset());
        }

        let (sql, params) = select.build();
        let rows = self.db.fetch_rows(&sql, params, schema.columns()?).await?;
        tracing::debug!(table = schema.table_name(), rows = rows.len(), "fetched rows");
        entities_from_rows(rows, None)
    }

    pub async fn fetch_one(&self, filter: Condition) -> Result<Option<Entity<E>>> {
        let (sql, params) = Self::select(Some(filter))?.limit(1).build();
        let row = self.db.fetch_row(&sql, params, E::schema().columns()?).await?;
        entity_from_row(row)
    }

    pub async fn count(&self, filter: Option<Condition>) -> Result<u64> {
        let (sql, params) = Self::select(filter)?.build_count();
        let columns = ["count".to_string()];
        match self.db.fetch_row(&sql, params, &columns).await?.and_then(|mut row| row.remove("count")) {
            Some(Value::Integer(count)) => Ok(count.max(0) as u64),
            Some(other) => Err(Error::TypeConversion { expected: "Integer", actual: format!("{:?}", other) }),
            None => Ok(0),
        }
    }

    /// Fetch one page plus the total number of matching rows.
    pub async fn fetch_page(&self, filter: Option<Condition>, page: Page) -> Result<(EntityCollection<E>, u64)> {
        let total = self.count(filter.clone()).await?;
        let entities = self.fetch_all(filter, Some(page)).await?;
        Ok((entities, total))
    }
}
