use anyhow::{Context, Result};
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};
use serde_json::Value;
use std::path::Path;
use uuid::Uuid;

use crate::db::migrations::run_migrations;
use crate::db::store::{Collection, ColumnKind, Filter, Record, RecordStore};
use crate::error::{StoreError, StoreResult};

/// Record store backed by a local SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Opening database at {:?}", path))?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        run_migrations(&conn).context("Running migrations")?;
        Ok(Self { conn })
    }
}

fn to_sql(kind: ColumnKind, value: &Value) -> StoreResult<SqlValue> {
    Ok(match (kind, value) {
        (_, Value::Null) => SqlValue::Null,
        (ColumnKind::Json, v) => SqlValue::Text(serde_json::to_string(v)?),
        (ColumnKind::Text, Value::String(s)) => SqlValue::Text(s.clone()),
        (ColumnKind::Text, other) => SqlValue::Text(other.to_string()),
    })
}

fn where_clause(
    collection: Collection,
    filters: &[Filter],
    params: &mut Vec<SqlValue>,
) -> StoreResult<String> {
    if filters.is_empty() {
        return Ok(String::new());
    }
    let mut parts = Vec::with_capacity(filters.len());
    for f in filters {
        let kind = collection.column_kind(&f.column)?;
        params.push(to_sql(kind, &f.value)?);
        parts.push(format!("{} = ?{}", f.column, params.len()));
    }
    Ok(format!(" WHERE {}", parts.join(" AND ")))
}

/// Builds a record from one row's cells. NULL cells are left out.
fn decode(collection: Collection, cells: Vec<Option<String>>) -> StoreResult<Record> {
    let mut record = Record::new();
    for ((name, kind), cell) in collection.columns().iter().zip(cells) {
        let Some(text) = cell else { continue };
        let value = match kind {
            ColumnKind::Text => Value::String(text),
            ColumnKind::Json => serde_json::from_str(&text)?,
        };
        record.insert(name.to_string(), value);
    }
    Ok(record)
}

fn map_write_err(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(e, msg) = &err {
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        {
            return StoreError::Conflict(msg.clone().unwrap_or_else(|| e.to_string()));
        }
    }
    StoreError::Sqlite(err)
}

impl RecordStore for SqliteStore {
    fn query(&self, collection: Collection, filters: &[Filter]) -> StoreResult<Vec<Record>> {
        let columns: Vec<&str> = collection.columns().iter().map(|(name, _)| *name).collect();
        let mut params = Vec::new();
        let where_sql = where_clause(collection, filters, &mut params)?;
        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY rowid",
            columns.join(", "),
            collection,
            where_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            (0..columns.len())
                .map(|i| row.get::<_, Option<String>>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?;

        let mut result = Vec::new();
        for r in rows {
            result.push(decode(collection, r?)?);
        }
        debug!("query {} ({} filters) -> {} records", collection, filters.len(), result.len());
        Ok(result)
    }

    fn insert(&self, collection: Collection, records: Vec<Record>) -> StoreResult<Vec<Record>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(records.len());

        for mut record in records {
            let id = match record.get("id") {
                Some(Value::String(id)) if !id.is_empty() => id.clone(),
                _ => {
                    let id = Uuid::new_v4().to_string();
                    record.insert("id".to_string(), Value::String(id.clone()));
                    id
                }
            };

            let mut columns = Vec::with_capacity(record.len());
            let mut params = Vec::with_capacity(record.len());
            for (column, value) in &record {
                let kind = collection.column_kind(column)?;
                columns.push(column.as_str());
                params.push(to_sql(kind, value)?);
            }
            let placeholders: Vec<String> = (1..=params.len()).map(|i| format!("?{i}")).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                collection,
                columns.join(", "),
                placeholders.join(", ")
            );
            tx.execute(&sql, params_from_iter(params.iter()))
                .map_err(map_write_err)?;
            ids.push(id);
        }
        tx.commit()?;

        let mut stored = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(record) = self.find_one(collection, &[Filter::id(id)])? {
                stored.push(record);
            }
        }
        debug!("insert {} -> {} records", collection, stored.len());
        Ok(stored)
    }

    fn update(
        &self,
        collection: Collection,
        filters: &[Filter],
        fields: &Record,
    ) -> StoreResult<usize> {
        if fields.is_empty() {
            return Ok(0);
        }
        let mut params = Vec::with_capacity(fields.len() + filters.len());
        let mut sets = Vec::with_capacity(fields.len());
        for (column, value) in fields {
            let kind = collection.column_kind(column)?;
            params.push(to_sql(kind, value)?);
            sets.push(format!("{} = ?{}", column, params.len()));
        }
        let where_sql = where_clause(collection, filters, &mut params)?;
        let sql = format!("UPDATE {} SET {}{}", collection, sets.join(", "), where_sql);

        let changed = self
            .conn
            .execute(&sql, params_from_iter(params.iter()))
            .map_err(map_write_err)?;
        debug!("update {} ({} fields) -> {} records", collection, fields.len(), changed);
        Ok(changed)
    }

    fn delete(&self, collection: Collection, filters: &[Filter]) -> StoreResult<usize> {
        let mut params = Vec::new();
        let where_sql = where_clause(collection, filters, &mut params)?;
        let sql = format!("DELETE FROM {}{}", collection, where_sql);
        let removed = self.conn.execute(&sql, params_from_iter(params.iter()))?;
        debug!("delete {} -> {} records", collection, removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::to_record;
    use serde_json::json;

    fn rec(value: Value) -> Record {
        to_record(&value).unwrap()
    }

    fn store_with_halqa() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert(Collection::Areas, vec![rec(json!({ "id": "north", "name": "North Area" }))])
            .unwrap();
        store
            .insert(
                Collection::Halqas,
                vec![rec(json!({
                    "id": "h1",
                    "area_id": "north",
                    "name": "Hegde Nagar",
                    "meeting_day": "Thursday",
                    "members": [{ "id": "m1", "name": "Member 1" }]
                }))],
            )
            .unwrap();
        store
    }

    fn meeting(halqa: &str, week: &str) -> Record {
        rec(json!({
            "halqa_id": halqa,
            "week_start_date": week,
            "status": "pending",
            "attendance": {},
            "agenda_status": {}
        }))
    }

    #[test]
    fn test_insert_assigns_identity_and_defaults() {
        let store = store_with_halqa();
        let inserted = store
            .insert(Collection::Meetings, vec![meeting("h1", "2024-10-15")])
            .unwrap();
        assert_eq!(inserted.len(), 1);
        let id = inserted[0].get("id").and_then(Value::as_str).unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert!(inserted[0].contains_key("created_at"));
        assert_eq!(inserted[0].get("attendance"), Some(&json!({})));
        assert!(!inserted[0].contains_key("missed_reason"));
    }

    #[test]
    fn test_query_with_filters() {
        let store = store_with_halqa();
        store
            .insert(
                Collection::Meetings,
                vec![meeting("h1", "2024-10-08"), meeting("h1", "2024-10-15")],
            )
            .unwrap();

        let all = store.query(Collection::Meetings, &[]).unwrap();
        assert_eq!(all.len(), 2);
        let week = store
            .query(
                Collection::Meetings,
                &[Filter::eq("halqa_id", "h1"), Filter::eq("week_start_date", "2024-10-15")],
            )
            .unwrap();
        assert_eq!(week.len(), 1);

        let halqa = store.find_one(Collection::Halqas, &[Filter::id("h1")]).unwrap().unwrap();
        assert_eq!(halqa.get("members"), Some(&json!([{ "id": "m1", "name": "Member 1" }])));
    }

    #[test]
    fn test_update_json_and_text_columns() {
        let store = store_with_halqa();
        let inserted = store
            .insert(Collection::Meetings, vec![meeting("h1", "2024-10-15")])
            .unwrap();
        let id = inserted[0].get("id").and_then(Value::as_str).unwrap().to_string();

        let changed = store
            .update(
                Collection::Meetings,
                &[Filter::id(&id)],
                &rec(json!({ "status": "missed", "attendance": { "m1": true }, "missed_reason": "rain" })),
            )
            .unwrap();
        assert_eq!(changed, 1);

        let m = store.find_one(Collection::Meetings, &[Filter::id(&id)]).unwrap().unwrap();
        assert_eq!(m.get("status"), Some(&json!("missed")));
        assert_eq!(m.get("attendance"), Some(&json!({ "m1": true })));
        assert_eq!(m.get("missed_reason"), Some(&json!("rain")));

        assert_eq!(store.update(Collection::Meetings, &[Filter::id("nope")], &rec(json!({ "status": "missed" }))).unwrap(), 0);
        assert_eq!(store.update(Collection::Meetings, &[], &Record::new()).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_week_is_conflict() {
        let store = store_with_halqa();
        store
            .insert(Collection::Meetings, vec![meeting("h1", "2024-10-15")])
            .unwrap();
        let err = store
            .insert(Collection::Meetings, vec![meeting("h1", "2024-10-15")])
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "{err:?}");
    }

    #[test]
    fn test_failed_batch_inserts_nothing() {
        let store = store_with_halqa();
        let err = store
            .insert(
                Collection::Meetings,
                vec![meeting("h1", "2024-10-15"), meeting("h1", "2024-10-15")],
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store.query(Collection::Meetings, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_column() {
        let store = store_with_halqa();
        let err = store
            .query(Collection::Meetings, &[Filter::eq("week; DROP TABLE meetings", "x")])
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
        let err = store
            .insert(Collection::Areas, vec![rec(json!({ "name": "West", "shape": "round" }))])
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { .. }));
    }

    #[test]
    fn test_delete_halqa_cascades_to_meetings() {
        let store = store_with_halqa();
        store
            .insert(Collection::Meetings, vec![meeting("h1", "2024-10-15")])
            .unwrap();
        assert_eq!(store.delete(Collection::Halqas, &[Filter::id("h1")]).unwrap(), 1);
        assert!(store.query(Collection::Meetings, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("halqa.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .insert(Collection::Areas, vec![rec(json!({ "id": "east", "name": "East Area" }))])
                .unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let areas = store.query(Collection::Areas, &[]).unwrap();
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].get("name"), Some(&json!("East Area")));
    }
}
