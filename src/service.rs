//! Load, save and delete entities through an [`Executor`]

use crate::Condition;
use crate::entity::Entity;
use crate::entity::EntityTrait;
use crate::entity::PrimaryValue;
use crate::error::Error;
use crate::error::Result;
use crate::executor::Executor;
use crate::query::Delete;
use crate::query::Select;
use crate::value::SemanticType;
use crate::value::Value;

/// Persists entities using their tracked changes
///
/// ```ignore
/// let service = EntityService::new(&conn);
///
/// let mut user = Entity::<User>::new()?;
/// user.set("name", "Alice")?;
/// service.save(&mut user).await?; // INSERT, id is filled in
///
/// user.set("name", "Alicia")?;
/// service.save(&mut user).await?; // UPDATE of "name" only
/// ```
pub struct EntityService<'a, X: Executor + ?Sized> {
    db: &'a X,
}

impl<'a, X: Executor + ?Sized> EntityService<'a, X> {
    pub fn new(db: &'a X) -> Self {
        Self { db }
    }

    /// Equality over every primary key column, in key order.
    pub fn primary_key_condition<E: EntityTrait>(entity: &Entity<E>) -> Result<Condition> {
        let columns = E::schema().primary_columns()?;
        let values = entity.primary_value()?.into_values();
        Ok(Condition::all(columns.iter().zip(values).map(|(column, value)| Condition::eq(column, value))))
    }

    /// Refresh an entity from its stored row.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error without a primary value, and
    /// [`Error::EntityNotFound`] when no row matches.
    #[tracing::instrument(skip_all, fields(table = E::schema().table_name()))]
    pub async fn load<E: EntityTrait>(&self, entity: &mut Entity<E>) -> Result<()> {
        let schema = E::schema();
        if !entity.has_primary_value()? {
            return Err(Error::InvalidArgument(format!(
                "a primary value is required to load \"{}\"",
                schema.table_name()
            )));
        }

        let columns = schema.columns()?;
        let (sql, params) = Select::new(schema.table_name(), columns.to_vec())
            .filter(Self::primary_key_condition(entity)?)
            .limit(1)
            .build();

        match self.db.fetch_row(&sql, params, columns).await? {
            Some(row) => {
                entity.load_from_row(&row)?;
                entity.clear_modified();
                Ok(())
            }
            None => Err(Error::EntityNotFound {
                table:         schema.table_name(),
                primary_value: entity.primary_value()?.to_string(),
            }),
        }
    }

    /// Write the entity's pending state.
    ///
    /// Returns `true` when an insert or update was executed. A pending delete
    /// is carried out instead and reports `false`, as does any save of an
    /// entity that was already deleted.
    #[tracing::instrument(skip_all, fields(table = E::schema().table_name()))]
    pub async fn save<E: EntityTrait>(&self, entity: &mut Entity<E>) -> Result<bool> {
        let schema = E::schema();

        if entity.is_deleted() {
            tracing::trace!("entity was deleted");
            return Ok(false);
        }

        if entity.should_delete_on_save() {
            if entity.has_primary_value()? {
                self.delete(entity).await?;
            } else {
                tracing::trace!("skipping delete of an entity that was never stored");
            }
            entity.set_delete_on_save(false);
            return Ok(false);
        }

        let insert = entity.should_insert_on_save()?;
        let force_insert = entity.should_force_insert();

        if !insert && !entity.has_modified() {
            tracing::trace!("nothing modified");
            return Ok(false);
        }

        let fields = schema.fields();
        let primary = schema.primary_indexes()?;
        let indexes: Vec<usize> = if insert {
            (0..fields.len()).collect()
        } else {
            entity.modified_indexes().iter().copied().collect()
        };
        let indexes: Vec<usize> = indexes.into_iter().filter(|idx| force_insert || !primary.contains(idx)).collect();

        for &idx in &indexes {
            fields[idx].validate(entity.value_at(idx))?;
        }

        let columns = schema.columns()?;
        let values: Vec<(String, Value)> =
            indexes.iter().map(|&idx| (columns[idx].clone(), entity.value_at(idx).clone())).collect();

        if insert {
            let had_primary = entity.has_primary_value()?;
            let generated = self.db.insert(schema.table_name(), values).await?;
            tracing::debug!(?generated, force_insert, "inserted");

            // Only a single integer key aliases the rowid
            let rowid_key = match primary {
                [idx] => fields[*idx].semantic_type() == SemanticType::Integer,
                _ => false,
            };
            if let (true, false, Some(id)) = (rowid_key, had_primary, generated) {
                tracing::trace!(id, "storing generated primary value");
                entity.set_primary_value(PrimaryValue::single(id))?;
            }
        } else if values.is_empty() {
            // Only the primary key was touched
            tracing::trace!("no writable fields modified");
            entity.clear_modified();
            entity.set_force_insert(false);
            return Ok(false);
        } else {
            let filter = Self::primary_key_condition(entity)?;
            let affected = self.db.update(schema.table_name(), values, filter).await?;
            tracing::debug!(affected, "updated");
        }

        entity.clear_modified();
        entity.set_force_insert(false);
        Ok(true)
    }

    /// Delete the entity's row and flag it deleted.
    #[tracing::instrument(skip_all, fields(table = E::schema().table_name()))]
    pub async fn delete<E: EntityTrait>(&self, entity: &mut Entity<E>) -> Result<()> {
        let schema = E::schema();
        if !entity.has_primary_value()? {
            return Err(Error::InvalidArgument(format!(
                "a primary value is required to delete from \"{}\"",
                schema.table_name()
            )));
        }

        let (sql, params) = Delete::new(schema.table_name()).filter(Self::primary_key_condition(entity)?).build();
        let affected = self.db.execute(&sql, params).await?;
        tracing::debug!(affected, "deleted");

        entity.set_deleted(true);
        Ok(())
    }
}
