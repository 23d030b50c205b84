//! Account store: user records behind a single-writer discipline.
//!
//! All state lives in one snapshot map guarded by a `tokio::sync::Mutex`.
//! Each operation holds the lock across its whole read-modify-write, so
//! expiry normalization and usage increments are atomic per call and the
//! lost-update race of a naive read-then-write store cannot occur within
//! one process.
//!
//! Persistence goes through the [`SnapshotBackend`] seam so the storage
//! technology (JSON file today) is swappable without touching policy or
//! handler code. Every mutation persists the full snapshot before
//! returning; the file write runs on the blocking pool while the writer
//! lock is held, so it never stalls an executor thread.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{UserPatch, UserRecord};
use crate::policy;

/// The full id → record mapping, persisted as one unit.
pub type Snapshot = HashMap<String, UserRecord>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The persistence layer failed; fatal to the request, not retried.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage seam for the account snapshot.
pub trait SnapshotBackend: Send + Sync {
    fn load(&self) -> Result<Snapshot, StoreError>;
    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// Snapshot as a single JSON file, the format the product has always used.
/// A missing file reads as an empty map.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotBackend for JsonFileBackend {
    fn load(&self) -> Result<Snapshot, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(Snapshot::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Unavailable(format!("snapshot is not valid JSON: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Snapshot::new()),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        }
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

/// The account repository: `get`, `upsert`, `charge_usage`.
pub struct AccountStore {
    records: Mutex<Snapshot>,
    backend: Arc<dyn SnapshotBackend>,
}

impl AccountStore {
    /// Load the snapshot through the backend; fails if the snapshot
    /// exists but cannot be read.
    pub fn open(backend: impl SnapshotBackend + 'static) -> Result<Self, StoreError> {
        let records = backend.load()?;
        Ok(Self {
            records: Mutex::new(records),
            backend: Arc::new(backend),
        })
    }

    /// Persist the snapshot on the blocking pool. Callers hold the writer
    /// lock across the await, which keeps mutations serialized in arrival
    /// order without stalling the executor on file I/O.
    async fn persist_snapshot(&self, records: &Snapshot) -> Result<(), StoreError> {
        let backend = Arc::clone(&self.backend);
        let snapshot = records.clone();
        tokio::task::spawn_blocking(move || backend.persist(&snapshot))
            .await
            .map_err(|e| StoreError::Unavailable(format!("persist task failed: {e}")))?
    }

    /// Fetch a user's record, lazily treating unknown ids as zero-valued.
    /// Expired pro status is normalized and, when that changes anything,
    /// persisted before returning.
    pub async fn get(&self, id: &str) -> Result<UserRecord, StoreError> {
        let mut records = self.records.lock().await;
        let mut record = records.get(id).cloned().unwrap_or_default();
        if policy::normalize_expiry(&mut record, Utc::now()) {
            records.insert(id.to_string(), record.clone());
            self.persist_snapshot(&records).await?;
        }
        Ok(record)
    }

    /// Merge the supplied fields into the user's record (creating it if
    /// absent) and persist the snapshot before returning.
    pub async fn upsert(&self, id: &str, patch: &UserPatch) -> Result<UserRecord, StoreError> {
        let mut records = self.records.lock().await;
        let mut record = records.get(id).cloned().unwrap_or_default();
        patch.apply(&mut record);
        policy::normalize_expiry(&mut record, Utc::now());
        records.insert(id.to_string(), record.clone());
        self.persist_snapshot(&records).await?;
        Ok(record)
    }

    /// Charge one successful transform. Called exactly once per completed
    /// request, never per input document and never on failure.
    pub async fn charge_usage(&self, id: &str) -> Result<UserRecord, StoreError> {
        let mut records = self.records.lock().await;
        let mut record = records.get(id).cloned().unwrap_or_default();
        record.count += 1;
        records.insert(id.to_string(), record.clone());
        self.persist_snapshot(&records).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn temp_store() -> (tempfile::TempDir, AccountStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(JsonFileBackend::new(dir.path().join("users.json"))).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn unknown_user_reads_as_zero_valued_record() {
        let (_dir, store) = temp_store();
        let record = store.get("nobody").await.unwrap();
        assert_eq!(record, UserRecord::default());
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let (_dir, store) = temp_store();
        let patch: UserPatch = serde_json::from_str(r#"{"count": 2, "name": "Ada"}"#).unwrap();
        store.upsert("user-1", &patch).await.unwrap();

        let record = store.get("user-1").await.unwrap();
        assert_eq!(record.count, 2);
        assert_eq!(record.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn charge_usage_increments_by_exactly_one() {
        let (_dir, store) = temp_store();
        store.charge_usage("u").await.unwrap();
        let record = store.charge_usage("u").await.unwrap();
        assert_eq!(record.count, 2);
    }

    #[tokio::test]
    async fn expiry_normalization_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        // Write the raw expired state directly; upsert would normalize it
        // before it ever hit disk.
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "expired".to_string(),
            UserRecord {
                pro: true,
                pro_until: Some(Utc::now() - Duration::hours(1)),
                count: 1,
                ..Default::default()
            },
        );
        JsonFileBackend::new(&path).persist(&snapshot).unwrap();

        let store = AccountStore::open(JsonFileBackend::new(&path)).unwrap();
        let record = store.get("expired").await.unwrap();
        assert!(!record.pro);
        assert_eq!(record.pro_until, None);

        // An independent reopen must observe the normalized state.
        let reopened = AccountStore::open(JsonFileBackend::new(&path)).unwrap();
        let record = reopened.get("expired").await.unwrap();
        assert!(!record.pro);
        assert_eq!(record.count, 1, "normalization must not touch usage");
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        {
            let store = AccountStore::open(JsonFileBackend::new(&path)).unwrap();
            store.charge_usage("persisted").await.unwrap();
        }

        let store = AccountStore::open(JsonFileBackend::new(&path)).unwrap();
        assert_eq!(store.get("persisted").await.unwrap().count, 1);
    }

    #[test]
    fn missing_snapshot_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("does-not-exist.json"));
        assert!(backend.load().unwrap().is_empty());
    }
}
