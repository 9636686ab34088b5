// src/database/memory.rs

use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::DocumentStore;
use crate::error::AppError;

/// Process-local document store.
/// Used when no `DATABASE_URL` is configured and by the integration tests.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, HashMap<String, (u64, Value)>>>,
    next_seq: AtomicU64,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with `PersistenceError`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::PersistenceError(
                "document store rejected the write".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn put(&self, collection: &str, id: &str, doc: Value) -> Result<(), AppError> {
        self.check_writable()?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.get_mut(id) {
            Some((_, existing)) => *existing = doc,
            None => {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                docs.insert(id.to_string(), (seq, doc));
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(id).is_some()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, AppError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut rows: Vec<&(u64, Value)> = docs.values().collect();
        rows.sort_by_key(|(seq, _)| *seq);
        Ok(rows.into_iter().map(|(_, doc)| doc.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn list_keeps_first_insertion_order() {
        let store = MemoryDocumentStore::new();
        store.put("c", "b", json!({"n": 1})).await.unwrap();
        store.put("c", "a", json!({"n": 2})).await.unwrap();
        store.put("c", "b", json!({"n": 3})).await.unwrap();

        let docs = store.list("c").await.unwrap();
        assert_eq!(docs, vec![json!({"n": 3}), json!({"n": 2})]);
    }

    #[tokio::test]
    async fn failing_writes_leave_data_untouched() {
        let store = MemoryDocumentStore::new();
        store.put("c", "a", json!(1)).await.unwrap();
        store.set_fail_writes(true);

        assert!(matches!(
            store.put("c", "a", json!(2)).await,
            Err(AppError::PersistenceError(_))
        ));
        assert!(store.delete("c", "a").await.is_err());
        assert_eq!(store.get("c", "a").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn delete_reports_missing_documents() {
        let store = MemoryDocumentStore::new();
        assert!(!store.delete("c", "missing").await.unwrap());
    }
}
