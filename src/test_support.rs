//! Shared fixtures for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDateTime;

use crate::entity::EntityTrait;
use crate::error::Result;
use crate::executor::Executor;
use crate::executor::RowData;
use crate::schema::DefaultValue;
use crate::schema::EntitySchema;
use crate::schema::FieldDef;
use crate::schema::PrimaryKey;
use crate::value::SemanticType;
use crate::value::Value;

static ITEM_FIELDS: [FieldDef; 6] = [
    FieldDef::new("id", SemanticType::Integer),
    FieldDef::new("someName", SemanticType::String).with_max_length(5).required(),
    FieldDef::new("qty", SemanticType::Integer).with_default(DefaultValue::Integer(1)).non_empty(),
    FieldDef::new("createdAt", SemanticType::DateTime),
    FieldDef::new("note", SemanticType::String).nullable(),
    FieldDef::new("active", SemanticType::Boolean),
];

static ITEM_SCHEMA: EntitySchema = EntitySchema::new("items", &ITEM_FIELDS, PrimaryKey::Single("id"));

/// Single integer key entity
pub(crate) struct Item;

impl EntityTrait for Item {
    fn schema() -> &'static EntitySchema {
        &ITEM_SCHEMA
    }
}

static PAIR_FIELDS: [FieldDef; 4] = [
    FieldDef::new("id", SemanticType::Integer),
    FieldDef::new("secondId", SemanticType::Integer),
    FieldDef::new("label", SemanticType::String),
    FieldDef::new("stamp", SemanticType::DateTime),
];

static PAIR_SCHEMA: EntitySchema =
    EntitySchema::new("pairs", &PAIR_FIELDS, PrimaryKey::Composite(&["id", "secondId"]));

/// Composite key entity that only understands the literal "epoch" as a datetime
pub(crate) struct Pair;

impl EntityTrait for Pair {
    fn schema() -> &'static EntitySchema {
        &PAIR_SCHEMA
    }

    fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
        if raw == "epoch" { DateTime::from_timestamp(0, 0).map(|d| d.naive_utc()) } else { None }
    }
}

static TAG_FIELDS: [FieldDef; 2] =
    [FieldDef::new("code", SemanticType::String), FieldDef::new("label", SemanticType::String)];

static TAG_SCHEMA: EntitySchema = EntitySchema::new("tags", &TAG_FIELDS, PrimaryKey::Single("code"));

/// Single text key entity
pub(crate) struct Tag;

impl EntityTrait for Tag {
    fn schema() -> &'static EntitySchema {
        &TAG_SCHEMA
    }
}

static BROKEN_FIELDS: [FieldDef; 1] = [FieldDef::new("name", SemanticType::String)];

static BROKEN_SCHEMA: EntitySchema = EntitySchema::new("broken", &BROKEN_FIELDS, PrimaryKey::Single("id"));

/// Entity whose primary key names an undeclared field
pub(crate) struct Broken;

impl EntityTrait for Broken {
    fn schema() -> &'static EntitySchema {
        &BROKEN_SCHEMA
    }
}

pub(crate) fn row(pairs: &[(&str, Value)]) -> RowData {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Recorded {
    Execute { sql: String, params: Vec<Value> },
    Fetch { sql: String, params: Vec<Value> },
}

/// Executor that records statements and replays queued result sets
#[derive(Default)]
pub(crate) struct MockExecutor {
    calls:          Mutex<Vec<Recorded>>,
    results:        Mutex<VecDeque<Vec<RowData>>>,
    next_insert_id: Mutex<Option<i64>>,
}

impl MockExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue the rows returned by the next fetch.
    pub(crate) fn push_rows(&self, rows: Vec<RowData>) {
        self.results.lock().unwrap().push_back(rows);
    }

    pub(crate) fn set_next_insert_id(&self, id: Option<i64>) {
        *self.next_insert_id.lock().unwrap() = id;
    }

    pub(crate) fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Recorded::Execute { sql, params } => Some((sql, params)),
                Recorded::Fetch { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64> {
        self.calls.lock().unwrap().push(Recorded::Execute { sql: sql.to_string(), params });
        Ok(1)
    }

    async fn fetch_rows(&self, sql: &str, params: Vec<Value>, _columns: &[String]) -> Result<Vec<RowData>> {
        self.calls.lock().unwrap().push(Recorded::Fetch { sql: sql.to_string(), params });
        Ok(self.results.lock().unwrap().pop_front().unwrap_or_default())
    }

    fn last_insert_id(&self) -> Option<i64> {
        *self.next_insert_id.lock().unwrap()
    }
}
