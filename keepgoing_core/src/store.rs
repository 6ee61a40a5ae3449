//! Persistence of the application data.
//!
//! The whole [`AppData`] aggregate is the unit of persistence. Reads never
//! fail: a missing, unreadable or corrupt store yields the default,
//! un-onboarded data. Write failures during [`AppStore::update`] are
//! logged and the in-memory result is kept.

use crate::routine::normalize_order;
use crate::{AppData, Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// File name of the data file inside the data directory
pub const DATA_FILE_NAME: &str = "keepgoing.json";

/// Backing store for [`AppData`]
pub trait AppStore {
    /// Load the stored data, or the default data if there is none
    fn load(&self) -> AppData;

    /// Overwrite the stored data
    fn save(&self, data: &AppData) -> Result<()>;

    /// Apply one user action as a single read-modify-write cycle
    ///
    /// Nothing is written if `f` fails. A failed write is logged and the
    /// value computed by `f` is still returned.
    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut AppData) -> Result<T>,
    {
        let mut data = self.load();
        let value = f(&mut data)?;
        if let Err(e) = self.save(&data) {
            tracing::warn!("Failed to save data: {}. Changes kept in memory only.", e);
        }
        Ok(value)
    }
}

/// JSON file store with file locking and atomic replacement
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by [`DATA_FILE_NAME`] inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(DATA_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    /// Open the sidecar lock file and hold it exclusively
    fn acquire_lock(&self) -> Result<File> {
        self.ensure_parent_dir()?;
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn read_contents(&self) -> Option<String> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open data file {:?}: {}. Using defaults.",
                    self.path,
                    e
                );
                return None;
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock data file {:?}: {}. Using defaults.",
                self.path,
                e
            );
            return None;
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        let _ = file.unlock();

        match read {
            Ok(_) => Some(contents),
            Err(e) => {
                tracing::warn!(
                    "Failed to read data file {:?}: {}. Using defaults.",
                    self.path,
                    e
                );
                None
            }
        }
    }
}

impl AppStore for JsonFileStore {
    fn load(&self) -> AppData {
        if !self.path.exists() {
            tracing::info!("No data file at {:?}, starting fresh", self.path);
            return AppData::default();
        }

        let Some(contents) = self.read_contents() else {
            return AppData::default();
        };

        match serde_json::from_str::<AppData>(&contents) {
            Ok(mut data) => {
                normalize_order(&mut data);
                tracing::debug!(
                    "Loaded {} exercises and {} day logs from {:?}",
                    data.exercises.len(),
                    data.logs.len(),
                    self.path
                );
                data
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse data file {:?}: {}. Using defaults.",
                    self.path,
                    e
                );
                AppData::default()
            }
        }
    }

    /// Atomically writes data by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn save(&self, data: &AppData) -> Result<()> {
        self.ensure_parent_dir()?;

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "data path missing parent",
            ))
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(data)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved data to {:?}", self.path);
        Ok(())
    }

    /// Holds an exclusive lock on a sidecar lock file for the whole cycle
    /// so concurrent processes cannot interleave their updates. If the lock
    /// cannot be taken the cycle still runs, unserialized.
    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut AppData) -> Result<T>,
    {
        let lock = match self.acquire_lock() {
            Ok(lock) => Some(lock),
            Err(e) => {
                tracing::warn!(
                    "Unable to lock {:?}: {}. Updating without a lock.",
                    self.lock_path(),
                    e
                );
                None
            }
        };

        let mut data = self.load();
        let result = f(&mut data);

        if result.is_ok() {
            if let Err(e) = self.save(&data) {
                tracing::warn!(
                    "Failed to save data to {:?}: {}. Changes kept in memory only.",
                    self.path,
                    e
                );
            }
        }

        if let Some(lock) = lock {
            let _ = lock.unlock();
        }
        result
    }
}

/// In-process store, mainly for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<AppData>,
}

impl MemoryStore {
    pub fn new(data: AppData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }
}

impl AppStore for MemoryStore {
    fn load(&self) -> AppData {
        match self.data.lock() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn save(&self, data: &AppData) -> Result<()> {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| Error::Other("memory store lock poisoned".into()))?;
        *guard = data.clone();
        Ok(())
    }

    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut AppData) -> Result<T>,
    {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| Error::Other("memory store lock poisoned".into()))?;
        let mut data = guard.clone();
        let value = f(&mut data)?;
        *guard = data;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DateKey;
    use crate::{Exercise, ExerciseKind, Target};

    fn sample_data() -> AppData {
        let mut data = AppData {
            exercises: vec![Exercise {
                id: "e1".into(),
                name: "Push-ups".into(),
                target: Target::Count { value: 15 },
                kind: ExerciseKind::Weights,
                order: 0,
            }],
            onboarded: true,
            ..AppData::default()
        };
        data.log_for_mut(DateKey::from_ymd(2024, 1, 1).unwrap())
            .completed
            .insert("e1".into());
        data.progress.record_prompt("e1", 10);
        data
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());

        let data = sample_data();
        store.save(&data).unwrap();

        assert_eq!(store.load(), data);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(&temp_dir.path().join("nested"));

        let data = store.load();
        assert!(!data.onboarded);
        assert!(data.exercises.is_empty());
        assert!(data.logs.is_empty());
    }

    #[test]
    fn test_corrupted_file_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        std::fs::write(store.path(), "{ invalid json }").unwrap();

        let data = store.load();
        assert_eq!(data, AppData::default());
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());

        store.save(&AppData::default()).unwrap();

        assert!(store.path().exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != DATA_FILE_NAME)
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only {}, found extras: {:?}",
            DATA_FILE_NAME,
            extras
        );
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        store.save(&sample_data()).unwrap();

        let count = store
            .update(|data| {
                data.exercises[0].name = "Diamond push-ups".into();
                Ok(data.exercises.len())
            })
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(store.load().exercises[0].name, "Diamond push-ups");
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        store.save(&sample_data()).unwrap();

        let result: Result<()> = store.update(|data| {
            data.exercises.clear();
            Err(Error::LastExercise)
        });

        assert!(matches!(result, Err(Error::LastExercise)));
        assert_eq!(store.load().exercises.len(), 1);
    }

    #[test]
    fn test_update_proceeds_when_lock_unavailable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        store.save(&sample_data()).unwrap();
        std::fs::create_dir(store.lock_path()).unwrap();

        let onboarded = store
            .update(|data| {
                data.exercises[0].name = "Wide push-ups".into();
                Ok(data.onboarded)
            })
            .unwrap();

        assert!(onboarded);
        assert_eq!(store.load().exercises[0].name, "Wide push-ups");
    }

    #[test]
    fn test_update_returns_value_when_save_fails() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let store = JsonFileStore::in_dir(&blocker);

        assert!(store.save(&sample_data()).is_err());

        let value = store
            .update(|data| {
                data.onboarded = true;
                Ok(42)
            })
            .unwrap();

        assert_eq!(value, 42);
        assert!(!store.load().onboarded);
    }

    #[test]
    fn test_load_sorts_by_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::in_dir(temp_dir.path());
        let json = r#"{
            "exercises": [
                {"id": "b", "name": "B", "target": {"type": "count", "value": 5}, "order": 4},
                {"id": "a", "name": "A", "target": {"type": "label", "text": "30s"}, "kind": "yoga", "order": 1}
            ],
            "logs": [],
            "onboarded": true
        }"#;
        std::fs::write(store.path(), json).unwrap();

        let data = store.load();
        assert_eq!(data.exercises[0].id, "a");
        assert_eq!(data.exercises[0].order, 0);
        assert_eq!(data.exercises[1].order, 1);
    }

    #[test]
    fn test_memory_store_update() {
        let store = MemoryStore::new(sample_data());

        store
            .update(|data| {
                data.onboarded = false;
                Ok(())
            })
            .unwrap();
        assert!(!store.load().onboarded);

        let result: Result<()> = store.update(|data| {
            data.onboarded = true;
            Err(Error::Other("nope".into()))
        });
        assert!(result.is_err());
        assert!(!store.load().onboarded);
    }
}
