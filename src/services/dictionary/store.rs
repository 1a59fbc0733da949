use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};

use crate::core::errors::{StoreError, StoreResult};

/// Durable string-keyed, string-valued map backing the lookup cache.
///
/// Reads are infallible (a missing key is `None`); writes may fail for
/// persistent backends. There is no removal: entries live as long as the
/// store does.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Number of stored entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process store, lost when dropped
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// JSON-file store with debounced background persistence.
///
/// `set` only touches memory and marks the store dirty; a background task
/// writes the whole map to disk `save_interval` after the first unsaved
/// change. Call [`FileStore::flush`] before shutdown to save the rest.
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

struct FileStoreInner {
    entries: RwLock<HashMap<String, String>>,
    path: PathBuf,

    // Debounced persistence
    dirty: AtomicBool,
    save_notify: Arc<Notify>,
    // Serializes flushes so an older snapshot never lands after a newer one
    save_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`, creating its directory if needed.
    ///
    /// A file that exists but does not parse is logged and replaced on the
    /// next flush. With `save_interval` of `None` nothing is written until
    /// [`FileStore::flush`] is called.
    pub async fn open(path: impl AsRef<Path>, save_interval: Option<Duration>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|source| StoreError::LoadFailed {
                        path: dir.display().to_string(),
                        source,
                    })?;
            }
        }

        let entries = if path.exists() {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| StoreError::LoadFailed {
                    path: path.display().to_string(),
                    source,
                })?;
            match serde_json::from_str::<HashMap<String, String>>(&data) {
                Ok(map) => map,
                Err(e) => {
                    warn!("Store file {} is corrupt, starting empty: {}", path.display(), e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        debug!("Opened store {} with {} entries", path.display(), entries.len());

        let store = Self {
            inner: Arc::new(FileStoreInner {
                entries: RwLock::new(entries),
                path,
                dirty: AtomicBool::new(false),
                save_notify: Arc::new(Notify::new()),
                save_lock: Mutex::new(()),
            }),
        };

        if let Some(interval) = save_interval {
            store.start_persistence_task(interval);
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Whether some `set` has not reached the file yet
    pub fn has_unsaved_changes(&self) -> bool {
        self.inner.dirty.load(Ordering::Acquire)
    }

    /// Write the current map to disk if anything changed since the last save
    pub async fn flush(&self) -> StoreResult<()> {
        self.inner.flush().await
    }

    /// Background task: wait for a change, let more pile up, then save.
    ///
    /// Holds only a weak reference so dropping the store ends the task.
    fn start_persistence_task(&self, interval: Duration) {
        let inner = Arc::downgrade(&self.inner);
        let notify = Arc::clone(&self.inner.save_notify);

        tokio::spawn(async move {
            loop {
                notify.notified().await;
                tokio::time::sleep(interval).await;

                let Some(inner) = Weak::upgrade(&inner) else {
                    break;
                };
                if let Err(e) = inner.flush().await {
                    warn!("Background store save failed: {}", e);
                }
            }
            debug!("Store persistence task stopped");
        });
    }
}

impl FileStoreInner {
    async fn flush(&self) -> StoreResult<()> {
        let _guard = self.save_lock.lock().await;

        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let result = self.write_file().await;
        if result.is_err() {
            // Keep the changes pending so the next flush retries them
            self.dirty.store(true, Ordering::Release);
        }
        result
    }

    async fn write_file(&self) -> StoreResult<()> {
        let json = {
            let entries = self.entries.read();
            serde_json::to_string_pretty(&*entries)?
        };

        // Write next to the target and rename so a crash never leaves a torn file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::SaveFailed {
                path: tmp.display().to_string(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::SaveFailed {
                path: self.path.display().to_string(),
                source,
            })?;

        debug!("Saved store {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.inner
            .entries
            .write()
            .insert(key.to_string(), value.to_string());

        self.inner.dirty.store(true, Ordering::Release);
        self.inner.save_notify.notify_one();
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.entries.read().len()
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        // Wake the persistence task so it notices the store is gone
        self.inner.save_notify.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("hello-en-es"), None);

        store.set("hello-en-es", "{}").unwrap();
        assert_eq!(store.get("hello-en-es").as_deref(), Some("{}"));

        store.set("hello-en-es", "[]").unwrap();
        assert_eq!(store.get("hello-en-es").as_deref(), Some("[]"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("dictionary.json");

        {
            let store = FileStore::open(&path, None).await.unwrap();
            store.set("languageCombinations", "[]").unwrap();
            store.set("time-en-ru", r#"{"head":{},"def":[]}"#).unwrap();
            assert!(store.has_unsaved_changes());
            store.flush().await.unwrap();
            assert!(!store.has_unsaved_changes());
        }

        let reopened = FileStore::open(&path, None).await.unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get("languageCombinations").as_deref(), Some("[]"));
        assert_eq!(
            reopened.get("time-en-ru").as_deref(),
            Some(r#"{"head":{},"def":[]}"#)
        );
    }

    #[tokio::test]
    async fn test_set_does_not_touch_disk_until_flushed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary.json");

        let store = FileStore::open(&path, None).await.unwrap();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        assert!(!path.exists());

        store.flush().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_background_task_saves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary.json");

        let store = FileStore::open(&path, Some(Duration::from_millis(20)))
            .await
            .unwrap();
        store.set("hello-en-es", "{}").unwrap();

        let mut saved = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            if !store.has_unsaved_changes() && path.exists() {
                saved = true;
                break;
            }
        }
        assert!(saved);

        let on_disk: HashMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.get("hello-en-es").map(String::as_str), Some("{}"));
    }

    #[tokio::test]
    async fn test_failed_flush_keeps_changes_pending() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        let path = cache_dir.join("dictionary.json");

        let store = FileStore::open(&path, None).await.unwrap();
        store.set("k", "v").unwrap();
        std::fs::remove_dir_all(&cache_dir).unwrap();

        let err = store.flush().await.unwrap_err();
        assert!(matches!(err, StoreError::SaveFailed { .. }));
        assert!(store.has_unsaved_changes());

        std::fs::create_dir_all(&cache_dir).unwrap();
        store.flush().await.unwrap();
        assert!(!store.has_unsaved_changes());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dictionary.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path, None).await.unwrap();
        assert!(store.is_empty());

        store.set("k", "v").unwrap();
        store.flush().await.unwrap();
        let reopened = FileStore::open(&path, None).await.unwrap();
        assert_eq!(reopened.get("k").as_deref(), Some("v"));
    }
}
