use chrono::Utc;
use geoquiz_core::model::{CompletionSummary, ProgressSnapshot};
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{
    ProgressRepository, StorageError, decode_progress, decode_summary, encode_progress,
    encode_summary, summary_key,
};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl SqliteRepository {
    /// Read the raw value stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` on query failures.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|r| r.try_get::<String, _>("value"))
            .transpose()
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Insert or replace the raw value at `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` on query failures.
    pub async fn put_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO kv_entries (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(&self, key: &str) -> Result<Option<ProgressSnapshot>, StorageError> {
        self.get_raw(key)
            .await?
            .map(|raw| decode_progress(key, &raw))
            .transpose()
    }

    async fn save_progress(
        &self,
        key: &str,
        progress: &ProgressSnapshot,
    ) -> Result<(), StorageError> {
        let raw = encode_progress(progress)?;
        self.put_raw(key, &raw).await
    }

    async fn load_summary(&self, key: &str) -> Result<Option<CompletionSummary>, StorageError> {
        let key = summary_key(key);
        self.get_raw(&key)
            .await?
            .map(|raw| decode_summary(&key, &raw))
            .transpose()
    }

    async fn save_summary(
        &self,
        key: &str,
        summary: &CompletionSummary,
    ) -> Result<(), StorageError> {
        let raw = encode_summary(summary)?;
        self.put_raw(&summary_key(key), &raw).await
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM kv_entries WHERE key IN (?1, ?2)")
            .bind(key)
            .bind(summary_key(key))
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }
}
