// src/database/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, postgres::PgPoolOptions, types::Json};

use super::DocumentStore;
use crate::error::AppError;

const CONNECT_RETRIES: u32 = 5;

/// Document store backed by the `documents` table (jsonb bodies).
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with retry and applies pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let mut retry_count = 0;
        let pool = loop {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) => {
                    retry_count += 1;
                    if retry_count > CONNECT_RETRIES {
                        return Err(AppError::PersistenceError(format!(
                            "Failed to connect to database after {} retries: {}",
                            CONNECT_RETRIES, e
                        )));
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        };

        tracing::info!("Database connected, running migrations...");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::PersistenceError(e.to_string()))?;
        tracing::info!("Migrations applied successfully.");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let body: Option<Json<Value>> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to read {}/{}: {:?}", collection, id, e);
                    AppError::from(e)
                })?;

        Ok(body.map(|Json(doc)| doc))
    }

    async fn put(&self, collection: &str, id: &str, doc: Value) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET
                body = EXCLUDED.body,
                updated_at = NOW()
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(doc))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write {}/{}: {:?}", collection, id, e);
            AppError::from(e)
        })?;

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete {}/{}: {:?}", collection, id, e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, AppError> {
        let rows: Vec<Json<Value>> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 ORDER BY inserted_at, id",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list {}: {:?}", collection, e);
            AppError::from(e)
        })?;

        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }
}
