use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::lock;
use crate::provider::{Filter, ProviderError, RecordStore};

/// Table operations, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Insert,
    Select,
    Update,
    Delete,
}

/// Rows kept per table as JSON objects. Inserts get a uuid `id` and a
/// `created_at`; updates merge the patch and stamp `updated_at`.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    failures: Mutex<HashSet<(String, Operation)>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `operation` on `table` fail with a rejection.
    pub fn fail_on(&self, table: &str, operation: Operation) {
        lock(&self.failures).insert((table.to_string(), operation));
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        lock(&self.tables).get(table).cloned().unwrap_or_default()
    }

    fn check(&self, table: &str, operation: Operation) -> Result<(), ProviderError> {
        if lock(&self.failures).contains(&(table.to_string(), operation)) {
            return Err(ProviderError::rejected(
                400,
                Some("injected_failure".to_string()),
                format!("{:?} on {} failed", operation, table),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, table: &str, mut row: Value) -> Result<Value, ProviderError> {
        self.check(table, Operation::Insert)?;

        let object = row
            .as_object_mut()
            .ok_or_else(|| ProviderError::rejected(400, Some("PGRST102".to_string()), "row must be an object"))?;
        object
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        object
            .entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        lock(&self.tables)
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, ProviderError> {
        self.check(table, Operation::Select)?;
        Ok(self
            .rows(table)
            .into_iter()
            .filter(|row| filter.matches(row))
            .collect())
    }

    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> Result<Vec<Value>, ProviderError> {
        self.check(table, Operation::Update)?;

        let now = Value::String(Utc::now().to_rfc3339());
        let mut tables = lock(&self.tables);
        let mut updated = Vec::new();
        for row in tables.entry(table.to_string()).or_default().iter_mut() {
            if !filter.matches(row) {
                continue;
            }
            if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
                target.insert("updated_at".to_string(), now.clone());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), ProviderError> {
        self.check(table, Operation::Delete)?;
        if let Some(rows) = lock(&self.tables).get_mut(table) {
            rows.retain(|row| !filter.matches(row));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = MemoryRecordStore::new();
        let row = store.insert("customers", json!({ "name": "Kim" })).await.unwrap();
        assert!(row["id"].is_string());
        assert!(row["created_at"].is_string());
        assert_eq!(store.rows("customers").len(), 1);
    }

    #[tokio::test]
    async fn injected_failures_are_rejections() {
        let store = MemoryRecordStore::new();
        store.fail_on("customers", Operation::Select);
        let err = store.select("customers", &Filter::all()).await.unwrap_err();
        assert!(!err.is_unavailable());
        assert!(store.insert("customers", json!({})).await.is_ok());
    }
}
