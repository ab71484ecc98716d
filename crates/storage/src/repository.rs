use async_trait::async_trait;
use geoquiz_core::model::{CompletionSummary, ProgressSnapshot, RegionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use geoquiz_core::model::{SUMMARY_KEY_SUFFIX, summary_key};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// A stored record exists but cannot be decoded. Callers treat the record
    /// as absent.
    #[error("unreadable record at `{key}`: {reason}")]
    Unreadable { key: String, reason: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    #[must_use]
    pub fn is_unreadable(&self) -> bool {
        matches!(self, StorageError::Unreadable { .. })
    }
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Persisted shape of a map's progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub correctly_guessed: Vec<String>,
    #[serde(default)]
    pub incorrectly_guessed: Vec<String>,
    #[serde(default)]
    pub mistakes_made: u32,
}

/// Early saves stored only the list of correctly guessed ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredProgress {
    Full(ProgressRecord),
    Legacy(Vec<String>),
}

impl ProgressRecord {
    #[must_use]
    pub fn from_snapshot(snapshot: &ProgressSnapshot) -> Self {
        Self {
            correctly_guessed: snapshot.correct.iter().map(ToString::to_string).collect(),
            incorrectly_guessed: snapshot.incorrect.iter().map(ToString::to_string).collect(),
            mistakes_made: snapshot.mistakes,
        }
    }

    /// Convert the record back into a domain snapshot. Blank ids are skipped.
    #[must_use]
    pub fn into_snapshot(self) -> ProgressSnapshot {
        let ids = |raw: Vec<String>| -> Vec<RegionId> {
            raw.into_iter().filter_map(|id| RegionId::new(id).ok()).collect()
        };
        ProgressSnapshot {
            correct: ids(self.correctly_guessed),
            incorrect: ids(self.incorrectly_guessed),
            mistakes: self.mistakes_made,
        }
    }
}

/// Persisted shape of a completion summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub mistakes: u32,
    /// Milliseconds.
    pub duration: u64,
    pub total_questions: u32,
}

impl SummaryRecord {
    #[must_use]
    pub fn from_summary(summary: &CompletionSummary) -> Self {
        Self {
            mistakes: summary.mistakes(),
            duration: summary.duration_ms(),
            total_questions: summary.total_questions(),
        }
    }

    #[must_use]
    pub fn into_summary(self) -> CompletionSummary {
        CompletionSummary::new(self.mistakes, self.duration, self.total_questions)
    }
}

/// Encode progress as the JSON stored under a map's key.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_progress(snapshot: &ProgressSnapshot) -> Result<String, StorageError> {
    serde_json::to_string(&ProgressRecord::from_snapshot(snapshot))
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decode progress JSON, accepting both the current and the legacy layout.
///
/// # Errors
///
/// Returns `StorageError::Unreadable` if the value is not a progress record.
pub fn decode_progress(key: &str, raw: &str) -> Result<ProgressSnapshot, StorageError> {
    let stored: StoredProgress =
        serde_json::from_str(raw).map_err(|e| StorageError::Unreadable {
            key: key.to_owned(),
            reason: e.to_string(),
        })?;
    let record = match stored {
        StoredProgress::Full(record) => record,
        StoredProgress::Legacy(correctly_guessed) => ProgressRecord {
            correctly_guessed,
            ..ProgressRecord::default()
        },
    };
    Ok(record.into_snapshot())
}

/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_summary(summary: &CompletionSummary) -> Result<String, StorageError> {
    serde_json::to_string(&SummaryRecord::from_summary(summary))
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// # Errors
///
/// Returns `StorageError::Unreadable` if the value is not a summary record.
pub fn decode_summary(key: &str, raw: &str) -> Result<CompletionSummary, StorageError> {
    serde_json::from_str::<SummaryRecord>(raw)
        .map(SummaryRecord::into_summary)
        .map_err(|e| StorageError::Unreadable {
            key: key.to_owned(),
            reason: e.to_string(),
        })
}

//
// ─── REPOSITORY ────────────────────────────────────────────────────────────────
//

/// Per-map persistence of progress and completion summaries.
///
/// `key` is the catalog entry's storage key; implementations derive the summary
/// location with [`summary_key`]. Writes are last-write-wins.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load saved progress for a map.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unreadable` for a corrupt record, or other storage errors.
    async fn load_progress(&self, key: &str) -> Result<Option<ProgressSnapshot>, StorageError>;

    /// Persist progress for a map, replacing what was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the progress cannot be stored.
    async fn save_progress(&self, key: &str, progress: &ProgressSnapshot)
    -> Result<(), StorageError>;

    /// Load the completion summary for a map.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unreadable` for a corrupt record, or other storage errors.
    async fn load_summary(&self, key: &str) -> Result<Option<CompletionSummary>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn save_summary(&self, key: &str, summary: &CompletionSummary)
    -> Result<(), StorageError>;

    /// Remove both progress and summary for a map.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be removed.
    async fn clear(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory key-value store holding the same JSON a browser's local
/// storage would.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw value, bypassing encoding. Useful for seeding legacy or corrupt data.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_entries(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    /// Read a raw stored value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>) -> T,
    ) -> Result<T, StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(f(&mut guard))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self, key: &str) -> Result<Option<ProgressSnapshot>, StorageError> {
        self.get_raw(key)?
            .map(|raw| decode_progress(key, &raw))
            .transpose()
    }

    async fn save_progress(
        &self,
        key: &str,
        progress: &ProgressSnapshot,
    ) -> Result<(), StorageError> {
        let raw = encode_progress(progress)?;
        self.insert_raw(key, &raw)
    }

    async fn load_summary(&self, key: &str) -> Result<Option<CompletionSummary>, StorageError> {
        let key = summary_key(key);
        self.get_raw(&key)?
            .map(|raw| decode_summary(&key, &raw))
            .transpose()
    }

    async fn save_summary(
        &self,
        key: &str,
        summary: &CompletionSummary,
    ) -> Result<(), StorageError> {
        let raw = encode_summary(summary)?;
        self.insert_raw(&summary_key(key), &raw)
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        let summary = summary_key(key);
        self.with_entries(|entries| {
            entries.remove(key);
            entries.remove(&summary);
        })
    }
}

/// Aggregates the repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(id: &str) -> RegionId {
        RegionId::new(id).unwrap()
    }

    fn snapshot() -> ProgressSnapshot {
        ProgressSnapshot {
            correct: vec![rid("KA"), rid("KL")],
            incorrect: vec![rid("KL")],
            mistakes: 3,
        }
    }

    #[tokio::test]
    async fn progress_round_trips() {
        let repo = InMemoryRepository::new();
        repo.save_progress("indiaMapGameProgress", &snapshot())
            .await
            .unwrap();

        let loaded = repo.load_progress("indiaMapGameProgress").await.unwrap();
        assert_eq!(loaded, Some(snapshot()));
        assert_eq!(repo.load_progress("usaMapGameProgress").await.unwrap(), None);
    }

    #[tokio::test]
    async fn stores_browser_compatible_json() {
        let repo = InMemoryRepository::new();
        repo.save_progress("k", &snapshot()).await.unwrap();
        repo.save_summary("k", &CompletionSummary::new(2, 61_000, 30))
            .await
            .unwrap();

        let progress = repo.get_raw("k").unwrap().unwrap();
        assert_eq!(
            progress,
            r#"{"correctlyGuessed":["KA","KL"],"incorrectlyGuessed":["KL"],"mistakesMade":3}"#
        );
        let summary = repo.get_raw("k_summary").unwrap().unwrap();
        assert_eq!(
            summary,
            r#"{"mistakes":2,"duration":61000,"totalQuestions":30}"#
        );
    }

    #[tokio::test]
    async fn reads_legacy_bare_array() {
        let repo = InMemoryRepository::new();
        repo.insert_raw("k", r#"["KA","","GA"]"#).unwrap();

        let loaded = repo.load_progress("k").await.unwrap().unwrap();
        assert_eq!(loaded.correct, vec![rid("KA"), rid("GA")]);
        assert!(loaded.incorrect.is_empty());
        assert_eq!(loaded.mistakes, 0);
    }

    #[tokio::test]
    async fn corrupt_records_are_unreadable() {
        let repo = InMemoryRepository::new();
        repo.insert_raw("k", "{not json").unwrap();
        repo.insert_raw("k_summary", r#"{"mistakes":"many"}"#).unwrap();

        let err = repo.load_progress("k").await.unwrap_err();
        assert!(err.is_unreadable());
        let err = repo.load_summary("k").await.unwrap_err();
        assert!(matches!(err, StorageError::Unreadable { ref key, .. } if key == "k_summary"));
    }

    #[tokio::test]
    async fn clear_removes_progress_and_summary_only_for_that_key() {
        let repo = InMemoryRepository::new();
        repo.save_progress("a", &snapshot()).await.unwrap();
        repo.save_summary("a", &CompletionSummary::new(0, 1_000, 2))
            .await
            .unwrap();
        repo.save_progress("b", &snapshot()).await.unwrap();

        repo.clear("a").await.unwrap();

        assert_eq!(repo.load_progress("a").await.unwrap(), None);
        assert_eq!(repo.load_summary("a").await.unwrap(), None);
        assert!(repo.load_progress("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn storage_in_memory_is_usable_through_trait_object() {
        let storage = Storage::in_memory();
        let summary = CompletionSummary::new(1, 500, 4);
        storage.progress.save_summary("m", &summary).await.unwrap();
        assert_eq!(
            storage.progress.load_summary("m").await.unwrap(),
            Some(summary)
        );
    }
}
