use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

pub type Record = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    /// Stored serialized; maps and lists such as `members` or `attendance`.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Areas,
    Halqas,
    Meetings,
}

const AREA_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Text),
    ("name", ColumnKind::Text),
    ("color", ColumnKind::Text),
];

const HALQA_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Text),
    ("area_id", ColumnKind::Text),
    ("name", ColumnKind::Text),
    ("meeting_day", ColumnKind::Text),
    ("members", ColumnKind::Json),
];

const MEETING_COLUMNS: &[(&str, ColumnKind)] = &[
    ("id", ColumnKind::Text),
    ("halqa_id", ColumnKind::Text),
    ("week_start_date", ColumnKind::Text),
    ("status", ColumnKind::Text),
    ("attendance", ColumnKind::Json),
    ("agenda_status", ColumnKind::Json),
    ("missed_reason", ColumnKind::Text),
    ("cancelled_reason", ColumnKind::Text),
    ("notes", ColumnKind::Text),
    ("created_at", ColumnKind::Text),
];

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Areas => "areas",
            Collection::Halqas => "halqas",
            Collection::Meetings => "meetings",
        }
    }

    pub fn columns(&self) -> &'static [(&'static str, ColumnKind)] {
        match self {
            Collection::Areas => AREA_COLUMNS,
            Collection::Halqas => HALQA_COLUMNS,
            Collection::Meetings => MEETING_COLUMNS,
        }
    }

    pub fn column_kind(&self, column: &str) -> StoreResult<ColumnKind> {
        self.columns()
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| StoreError::UnknownColumn {
                collection: self.as_str().to_string(),
                column: column.to_string(),
            })
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            value: value.into(),
        }
    }

    pub fn id(id: &str) -> Self {
        Self::eq("id", id)
    }
}

/// Generic create/select/update/delete over named collections.
///
/// Records are flat key/value maps. Filters are equality predicates on the
/// collection's known columns, combined with AND.
pub trait RecordStore {
    /// Records matching every filter. Empty filters select everything.
    fn query(&self, collection: Collection, filters: &[Filter]) -> StoreResult<Vec<Record>>;

    /// Inserts records, assigning an `id` to those without one, and returns
    /// them as stored.
    fn insert(&self, collection: Collection, records: Vec<Record>) -> StoreResult<Vec<Record>>;

    /// Applies `fields` to every matching record; returns how many matched.
    fn update(&self, collection: Collection, filters: &[Filter], fields: &Record)
    -> StoreResult<usize>;

    /// Removes every matching record; returns how many were removed.
    fn delete(&self, collection: Collection, filters: &[Filter]) -> StoreResult<usize>;

    fn find_one(&self, collection: Collection, filters: &[Filter]) -> StoreResult<Option<Record>> {
        Ok(self.query(collection, filters)?.into_iter().next())
    }
}

pub fn to_record<T: Serialize>(value: &T) -> StoreResult<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Decode(format!("expected an object, got {other}"))),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

pub fn from_records<T: DeserializeOwned>(records: Vec<Record>) -> StoreResult<Vec<T>> {
    records.into_iter().map(from_record).collect()
}
