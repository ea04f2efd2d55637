//! Prelude module for rowtrack
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use rowtrack::prelude::*;
//! ```

pub use chrono::NaiveDateTime;
pub use rowtrack_macros::Entity;

pub use crate::connection::Builder;
pub use crate::connection::Connection;
pub use crate::entity::Entity;
pub use crate::entity::EntityTrait;
pub use crate::entity::ModelTrait;
pub use crate::entity::PrimaryValue;
pub use crate::error::Error;
pub use crate::error::Result;
pub use crate::executor::Executor;
pub use crate::fetcher::EntityCollection;
pub use crate::fetcher::EntityFetcher;
pub use crate::fetcher::Page;
pub use crate::migration::Migration;
pub use crate::migration::Migrator;
pub use crate::query::Condition;
pub use crate::query::Order;
pub use crate::query::OrderBy;
pub use crate::service::EntityService;
pub use crate::value::FromValue;
pub use crate::value::IntoValue;
pub use crate::value::Value;
