//! Numbered migration runner
//!
//! Migrations are identified by a positive number. Applied numbers are kept
//! in a bookkeeping table (`migrations` unless renamed), which is created the
//! first time it is needed.
//!
//! # Example
//!
//! ```ignore
//! use rowtrack::prelude::*;
//!
//! struct CreateUsers;
//!
//! #[async_trait::async_trait]
//! impl Migration for CreateUsers {
//!     fn number(&self) -> u32 {
//!         1
//!     }
//!
//!     async fn up(&self, db: &dyn Executor) -> Result<()> {
//!         db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY)", vec![]).await?;
//!         Ok(())
//!     }
//! }
//!
//! let mut migrator = Migrator::new(&conn, vec![Box::new(CreateUsers)])?
//!     .with_info_callback(|line| println!("{}", line));
//! migrator.migrate(None).await?;
//! ```

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;

use crate::error::Error;
use crate::error::Result;
use crate::executor::Executor;
use crate::query::Condition;
use crate::query::Delete;
use crate::query::OrderBy;
use crate::query::Select;
use crate::query::quote_identifier;
use crate::value::IntoValue;
use crate::value::Value;

const NUMBER_COLUMN: &str = "migration_number";
const COMPLETED_COLUMN: &str = "completed_at";

/// One schema step, applied going up and optionally reverted going down
#[async_trait]
pub trait Migration: Send + Sync {
    /// Position of this migration. Must be at least 1 and unique per migrator.
    fn number(&self) -> u32;

    async fn up(&self, db: &dyn Executor) -> Result<()>;

    async fn down(&self, _db: &dyn Executor) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

type InfoCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Applies [`Migration`]s against an executor and tracks what ran
pub struct Migrator<'a> {
    db:          &'a dyn Executor,
    table_name:  String,
    migrations:  BTreeMap<u32, Box<dyn Migration>>,
    migrated:    Option<Vec<u32>>,
    table_ready: bool,
    info:        Option<InfoCallback>,
}

impl<'a> Migrator<'a> {
    /// Register `migrations`. Zero or repeated numbers are rejected.
    pub fn new(db: &'a dyn Executor, migrations: Vec<Box<dyn Migration>>) -> Result<Self> {
        let mut registered = BTreeMap::new();
        for migration in migrations {
            let number = migration.number();
            if number == 0 {
                return Err(Error::Logic("Migration number must be at least 1".to_string()));
            }
            if registered.insert(number, migration).is_some() {
                return Err(Error::Logic(format!("Duplicate migration number {}", number)));
            }
        }

        Ok(Self {
            db,
            table_name: "migrations".to_string(),
            migrations: registered,
            migrated: None,
            table_ready: false,
            info: None,
        })
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Receive the progress lines also emitted through `tracing`.
    pub fn with_info_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.info = Some(Box::new(callback));
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Registered numbers in ascending order.
    pub fn numbers(&self) -> Vec<u32> {
        self.migrations.keys().copied().collect()
    }

    /// Highest registered number, or 0 without migrations.
    pub fn latest_number(&self) -> u32 {
        self.migrations.keys().next_back().copied().unwrap_or(0)
    }

    /// Highest applied number, or 0 when nothing has run.
    pub async fn current_number(&mut self) -> Result<u32> {
        Ok(self.migrated_numbers().await?.last().copied().unwrap_or(0))
    }

    pub async fn direction(&mut self, to: u32) -> Result<Direction> {
        Ok(if self.current_number().await? > to { Direction::Down } else { Direction::Up })
    }

    /// Numbers that would run to reach `to`, in execution order.
    ///
    /// Going up these are the unapplied numbers up to and including `to`,
    /// ascending. Going down they are the applied numbers above `to`,
    /// descending.
    pub async fn migrations_to(&mut self, to: u32) -> Result<Vec<u32>> {
        let direction = self.direction(to).await?;
        let migrated = self.migrated_numbers().await?.to_vec();

        let numbers = match direction {
            Direction::Up => {
                self.migrations.keys().copied().filter(|n| *n <= to && !migrated.contains(n)).collect()
            }
            Direction::Down => {
                self.migrations.keys().rev().copied().filter(|n| *n > to && migrated.contains(n)).collect()
            }
        };
        Ok(numbers)
    }

    /// Bring the database to migration `to`, or the latest one when `None`.
    ///
    /// `Some(0)` reverts every applied migration. Returns whether any
    /// migration ran.
    #[tracing::instrument(skip_all, fields(table = %self.table_name))]
    pub async fn migrate(&mut self, to: Option<u32>) -> Result<bool> {
        let current = self.current_number().await?;
        let latest = self.latest_number();
        if current > latest {
            return Err(Error::Migration(format!(
                "The current migration number ({}) is higher than latest available ({}). Something is wrong!",
                current, latest
            )));
        }

        let to = self.target_number(to)?;
        let pending = self.migrations_to(to).await?;

        if pending.is_empty() {
            self.info(&format!("No migrations available, things are up to date (migration {})!", current));
            return Ok(false);
        }

        self.info(&format!("Running {} migrations from migration {} to {}...", pending.len(), current, to));

        let direction = self.direction(to).await?;
        for number in &pending {
            self.run(*number, direction).await?;
        }

        self.info(&format!("Done! {} migrations migrated!", pending.len()));
        Ok(true)
    }

    fn target_number(&self, to: Option<u32>) -> Result<u32> {
        match to {
            None => Ok(self.latest_number()),
            Some(0) => Ok(0),
            Some(number) if self.migrations.contains_key(&number) => Ok(number),
            Some(number) => Err(Error::InvalidArgument(format!("Invalid migration number {}", number))),
        }
    }

    async fn run(&mut self, number: u32, direction: Direction) -> Result<()> {
        let db = self.db;
        let migration = self
            .migrations
            .get(&number)
            .ok_or_else(|| Error::Logic(format!("Migration {} is not registered", number)))?;

        match direction {
            Direction::Up => {
                self.info(&format!(" - Migrating up {}...", number));
                migration.up(db).await?;
                self.add_migrated(number).await
            }
            Direction::Down => {
                self.info(&format!(" - Migrating down {}...", number));
                migration.down(db).await?;
                self.delete_migrated(number).await
            }
        }
    }

    async fn ensure_table(&mut self) -> Result<()> {
        if self.table_ready {
            return Ok(());
        }

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({} INTEGER NOT NULL PRIMARY KEY, {} TEXT NOT NULL)",
            quote_identifier(&self.table_name),
            quote_identifier(NUMBER_COLUMN),
            quote_identifier(COMPLETED_COLUMN),
        );
        self.db.execute(&sql, Vec::new()).await?;
        self.table_ready = true;
        Ok(())
    }

    async fn migrated_numbers(&mut self) -> Result<&[u32]> {
        if self.migrated.is_none() {
            self.ensure_table().await?;

            let columns = vec![NUMBER_COLUMN.to_string()];
            let (sql, params) =
                Select::new(&self.table_name, columns.clone()).order_by(OrderBy::asc(NUMBER_COLUMN)).build();
            let rows = self.db.fetch_rows(&sql, params, &columns).await?;

            let mut numbers = Vec::with_capacity(rows.len());
            for row in rows {
                numbers.push(migration_number(row.get(NUMBER_COLUMN))?);
            }
            numbers.sort_unstable();
            self.migrated = Some(numbers);
        }

        Ok(self.migrated.as_deref().unwrap_or_default())
    }

    async fn add_migrated(&mut self, number: u32) -> Result<()> {
        self.ensure_table().await?;
        let completed_at = Value::DateTime(chrono::Utc::now().naive_utc());
        self.db
            .insert(
                &self.table_name,
                vec![(NUMBER_COLUMN.to_string(), number.into_value()), (COMPLETED_COLUMN.to_string(), completed_at)],
            )
            .await?;

        if let Some(migrated) = self.migrated.as_mut() {
            migrated.push(number);
            migrated.sort_unstable();
        }
        Ok(())
    }

    async fn delete_migrated(&mut self, number: u32) -> Result<()> {
        self.ensure_table().await?;
        let (sql, params) = Delete::new(&self.table_name).filter(Condition::eq(NUMBER_COLUMN, number)).build();
        self.db.execute(&sql, params).await?;

        if let Some(migrated) = self.migrated.as_mut() {
            migrated.retain(|n| *n != number);
        }
        Ok(())
    }

    fn info(&self, line: &str) {
        tracing::info!("{}", line);
        if let Some(callback) = &self.info {
            callback(line);
        }
    }
}

impl fmt::Debug for Migrator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("table_name", &self.table_name)
            .field("numbers", &self.numbers())
            .field("migrated", &self.migrated)
            .finish()
    }
}

fn migration_number(value: Option<&Value>) -> Result<u32> {
    match value {
        Some(Value::Integer(n)) => u32::try_from(*n).map_err(|_| Error::TypeConversion {
            expected: "u32",
            actual:   n.to_string(),
        }),
        Some(other) => Err(Error::TypeConversion { expected: "u32", actual: format!("{:?}", other) }),
        None => Err(Error::UnexpectedNull),
    }
}
