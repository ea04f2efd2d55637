//! # rowtrack
//!
//! A small change-tracking ORM for [Turso](https://turso.tech).
//!
//! ## Features
//!
//! - Entities that remember which properties changed since they were loaded
//! - Save that inserts new rows, updates only modified columns, or deletes
//! - Validation of declared lengths and required values before any write
//! - Single and composite primary keys
//! - Keyed collection fetching with pagination
//! - Numbered up/down migrations
//!
//! ## Quick Start
//!
//! ```ignore
//! use rowtrack::prelude::*;
//!
//! #[derive(Clone, Debug, Entity)]
//! #[rowtrack(table_name = "users")]
//! pub struct User {
//!     #[rowtrack(primary_key)]
//!     pub id:         i64,
//!     #[rowtrack(max_length = 50, required)]
//!     pub name:       String,
//!     pub email:      Option<String>,
//!     pub created_at: Option<NaiveDateTime>,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let db = Builder::new_local(":memory:").build().await?;
//!     let conn = db.connect()?;
//!     conn.execute(&User::schema().create_table_sql(true)?, vec![]).await?;
//!
//!     let service = EntityService::new(&conn);
//!
//!     // Insert
//!     let mut user = Entity::<User>::new()?;
//!     user.set_name("Alice".to_string())?;
//!     service.save(&mut user).await?;
//!
//!     // Partial update; only "name" is written
//!     user.set_name("Alice Smith".to_string())?;
//!     service.save(&mut user).await?;
//!
//!     // Load by primary key
//!     let mut loaded = Entity::<User>::with_primary_value(user.primary_value()?)?;
//!     service.load(&mut loaded).await?;
//!
//!     // Fetch a keyed collection
//!     let users = EntityFetcher::<User, _>::new(&conn)
//!         .fetch_all(Some(Condition::eq("name", "Alice Smith")), None)
//!         .await?;
//!
//!     // Delete
//!     service.delete(&mut user).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Entity Attributes
//!
//! The `#[rowtrack(...)]` attribute supports:
//!
//! - `table_name = "..."` - Set the table name (default: struct name in snake_case)
//! - `primary_key` - Mark a field as (part of) the primary key
//! - `property = "..."` - Set the property name (default: field name in camelCase)
//! - `max_length = N` - Reject longer string values on save
//! - `required` - Reject null, false or empty string values on save
//! - `non_empty` - Reject zero, false or empty values on save
//! - `default = ...` - Literal default for new entities
//!
//! Properties map to snake_case columns: `createdAt` is stored in `created_at`.

pub mod connection;
pub mod entity;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod migration;
pub mod naming;
pub mod prelude;
pub mod query;
pub mod schema;
pub mod service;
pub mod value;

#[cfg(test)]
mod test_support;

pub use connection::Builder;
pub use connection::Connection;
pub use connection::Database;
pub use entity::Entity;
pub use entity::EntitySnapshot;
pub use entity::EntityTrait;
pub use entity::ModelTrait;
pub use entity::PrimaryValue;
pub use error::Error;
pub use error::Result;
pub use error::ValidationFailure;
pub use executor::Executor;
pub use executor::RowData;
pub use executor::filter_strip_row;
pub use fetcher::EntityCollection;
pub use fetcher::EntityFetcher;
pub use fetcher::Page;
pub use fetcher::entities_from_rows;
pub use fetcher::entity_from_row;
pub use migration::Migration;
pub use migration::Migrator;
pub use query::Condition;
pub use query::Delete;
pub use query::Insert;
pub use query::Order;
pub use query::OrderBy;
pub use query::Select;
pub use query::Update;
// Derive macro; lives in the macro namespace next to the `Entity` struct
pub use rowtrack_macros::Entity;
pub use schema::DefaultValue;
pub use schema::EntitySchema;
pub use schema::FieldDef;
pub use schema::PrimaryKey;
pub use service::EntityService;
pub use value::FromValue;
pub use value::IntoValue;
pub use value::SemanticType;
pub use value::Value;
