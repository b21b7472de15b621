//! In-memory `RecordStore` used by workflow tests. Behaves like the real
//! store for the slice of the contract the workflows rely on: generated
//! ids, natural insertion order, Eq/Neq filters, and conflict on
//! configured unique keys.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{Filter, RecordStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    unique_keys: Vec<(String, Vec<&'static str>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a unique key over `fields`; inserts clashing on every
    /// field yield `StoreError::Conflict`, as a store-level unique index
    /// would.
    pub fn with_unique(mut self, table: &str, fields: &[&'static str]) -> Self {
        self.unique_keys.push((table.to_string(), fields.to_vec()));
        self
    }

    /// Raw contents of a table, for post-state assertions.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

fn field_text(row: &Value, field: &str) -> Option<String> {
    row.get(field).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| match f {
        Filter::Eq(field, value) => field_text(row, field).as_deref() == Some(value),
        Filter::Neq(field, value) => field_text(row, field).as_deref() != Some(value),
    })
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn select_one(&self, table: &str, filters: &[Filter]) -> Result<Value, StoreError> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .and_then(|rows| rows.iter().find(|row| matches(row, filters)).cloned())
            .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();

        for (unique_table, fields) in &self.unique_keys {
            if unique_table == table {
                let clash = rows.iter().any(|existing| {
                    fields
                        .iter()
                        .all(|f| field_text(existing, f) == field_text(&record, f))
                });
                if clash {
                    return Err(StoreError::Conflict(format!(
                        "duplicate key value violates unique constraint on \"{table}\""
                    )));
                }
            }
        }

        let mut stored = record;
        if let Value::Object(map) = &mut stored {
            map.insert("id".to_string(), json!(Uuid::new_v4()));
            map.entry("created_at").or_insert(json!(Utc::now()));
        }
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), StoreError> {
        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            rows.retain(|row| !matches(row, filters));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_generates_id_and_timestamp() {
        let store = MemoryStore::new();
        let row = store
            .insert("trees", json!({"name": "Oak1"}))
            .await
            .unwrap();
        assert!(row.get("id").and_then(Value::as_str).is_some());
        assert!(row.get("created_at").is_some());
    }

    #[tokio::test]
    async fn test_eq_and_neq_filters() {
        let store = MemoryStore::new();
        store.insert("trees", json!({"name": "a"})).await.unwrap();
        store.insert("trees", json!({"name": "b"})).await.unwrap();

        let hits = store
            .select("trees", &[Filter::Eq("name", "a".to_string())])
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let misses = store
            .select("trees", &[Filter::Neq("name", "a".to_string())])
            .await
            .unwrap();
        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0]["name"], "b");
    }

    #[tokio::test]
    async fn test_unique_key_conflict() {
        let store = MemoryStore::new().with_unique("trees", &["name", "species"]);
        store
            .insert("trees", json!({"name": "a", "species": "Oak"}))
            .await
            .unwrap();

        let err = store
            .insert("trees", json!({"name": "a", "species": "Oak"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // Same name under a different species is a different key.
        store
            .insert("trees", json!({"name": "a", "species": "Pine"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_select_one_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .select_one("trees", &[Filter::Eq("name", "ghost".to_string())])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_with_filters() {
        let store = MemoryStore::new();
        store.insert("ratings", json!({"tree_id": "t1"})).await.unwrap();
        store.insert("ratings", json!({"tree_id": "t2"})).await.unwrap();

        store
            .delete("ratings", &[Filter::Eq("tree_id", "t1".to_string())])
            .await
            .unwrap();
        assert_eq!(store.rows("ratings").len(), 1);
    }
}
