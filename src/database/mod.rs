// src/database/mod.rs

//! Persistence collaborator.
//!
//! Documents are JSON values grouped in named collections and keyed by id.
//! `list` returns documents in first-insertion order; re-writing a document
//! keeps its position.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::AppError;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

pub const MATERIALS: &str = "materials";
pub const STUDENTS: &str = "students";
pub const ASSESSMENTS: &str = "assessments";
pub const FACULTY_META: &str = "faculty_meta";
pub const PROFILES: &str = "users";
pub const QUIZ_RESULTS: &str = "quiz_results";

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError>;

    /// Inserts or replaces the document.
    async fn put(&self, collection: &str, id: &str, doc: Value) -> Result<(), AppError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError>;

    async fn list(&self, collection: &str) -> Result<Vec<Value>, AppError>;
}

fn decode<T: DeserializeOwned>(collection: &str, doc: Value) -> Result<T, AppError> {
    serde_json::from_value(doc).map_err(|e| {
        AppError::PersistenceError(format!("corrupt document in '{}': {}", collection, e))
    })
}

pub async fn get_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<Option<T>, AppError> {
    store
        .get(collection, id)
        .await?
        .map(|doc| decode(collection, doc))
        .transpose()
}

pub async fn put_as<T: Serialize>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
    value: &T,
) -> Result<(), AppError> {
    let doc = serde_json::to_value(value)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    store.put(collection, id, doc).await
}

/// Deletes a document the caller already knows about. A missing row only
/// means the store was ahead of us, so it is logged, not returned.
pub async fn delete_doc(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<(), AppError> {
    if !store.delete(collection, id).await? {
        tracing::warn!("Document {}/{} was already gone", collection, id);
    }
    Ok(())
}

pub async fn list_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<T>, AppError> {
    store
        .list(collection)
        .await?
        .into_iter()
        .map(|doc| decode(collection, doc))
        .collect()
}
