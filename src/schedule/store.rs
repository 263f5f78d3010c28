//! Best-effort persistence of the week to a local key-value store.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use directories::ProjectDirs;
use tokio::runtime::Handle;

use super::model::{WeekSchedule, STORAGE_KEY};
use super::Wake;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to read schedule: {0}")]
    Read(#[source] StoreError),

    #[error("stored schedule is not valid: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode schedule: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write schedule: {0}")]
    Write(#[source] StoreError),
}

/// String-keyed local storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform data directory for the app
    pub fn default_location() -> anyhow::Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "shuukan", "shuukan")
            .context("Could not determine data directory")?;
        Ok(Self::new(proj_dirs.data_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        // Overlapping saves each write their own temp file; the last rename wins
        let path = self.path_for(key);
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, value)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::Io(err));
        }
        Ok(())
    }
}

/// Session-only store, used when no data directory is available
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `Ok(None)` means nothing has been stored yet
pub fn load_week(store: &dyn KeyValueStore) -> Result<Option<WeekSchedule>, PersistError> {
    let raw = match store.get(STORAGE_KEY).map_err(PersistError::Read)? {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(None),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(PersistError::Decode)
}

pub fn save_week(store: &dyn KeyValueStore, week: &WeekSchedule) -> Result<(), PersistError> {
    let raw = serde_json::to_string(week).map_err(PersistError::Encode)?;
    store.set(STORAGE_KEY, &raw).map_err(PersistError::Write)
}

pub const LOAD_FAILED_NOTICE: &str = "Failed to load your schedule. Some data may be missing.";
pub const SAVE_FAILED_NOTICE: &str = "Failed to save your changes to schedule.";

/// Outcome of a background round trip, drained on the UI thread
#[derive(Debug)]
pub enum PersistEvent {
    Loaded(Option<WeekSchedule>),
    LoadFailed(String),
    Saved,
    SaveFailed(String),
}

/// Runs loads and saves off the UI thread. Calls are fire-and-forget and
/// not ordered against each other. `wake` runs after each result is sent.
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
    runtime: Handle,
    tx: Sender<PersistEvent>,
    wake: Wake,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>, runtime: Handle, tx: Sender<PersistEvent>, wake: Wake) -> Self {
        Self { store, runtime, tx, wake }
    }

    fn post(tx: &Sender<PersistEvent>, wake: &Wake, event: PersistEvent) {
        if tx.send(event).is_ok() {
            wake();
        }
    }

    pub fn load(&self) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        let wake = Wake::clone(&self.wake);
        self.runtime.spawn_blocking(move || {
            let event = match load_week(store.as_ref()) {
                Ok(week) => {
                    tracing::debug!(found = week.is_some(), "schedule loaded");
                    PersistEvent::Loaded(week)
                }
                Err(e) => {
                    tracing::warn!("Failed to load schedule data: {}", e);
                    PersistEvent::LoadFailed(LOAD_FAILED_NOTICE.to_string())
                }
            };
            Self::post(&tx, &wake, event);
        });
    }

    pub fn save(&self, week: WeekSchedule) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        let wake = Wake::clone(&self.wake);
        self.runtime.spawn_blocking(move || {
            let event = match save_week(store.as_ref(), &week) {
                Ok(()) => {
                    tracing::debug!(events = week.total_events(), "schedule saved");
                    PersistEvent::Saved
                }
                Err(e) => {
                    tracing::warn!("Failed to save schedule data: {}", e);
                    PersistEvent::SaveFailed(SAVE_FAILED_NOTICE.to_string())
                }
            };
            Self::post(&tx, &wake, event);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::model::{Day, Event};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::channel;
    use std::time::Duration;

    fn no_wake() -> Wake {
        Arc::new(|| {})
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }
    }

    fn sample_week() -> WeekSchedule {
        let mut week = WeekSchedule::new();
        week.add(Day::Mon, Event::new("Standup", "Zoom", "09:00", "09:15"));
        week.add(Day::Mon, Event::new("Lunch", "Cafe", "08:00", "08:30"));
        week.add(Day::Sun, Event::new("Run", "Park", "07:00", "06:00"));
        week
    }

    #[test]
    fn round_trips_through_file_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("nested"));
        let week = sample_week();

        save_week(&store, &week).expect("save should succeed");
        let loaded = load_week(&store).expect("load should succeed");
        assert_eq!(loaded, Some(week));
    }

    #[test]
    fn missing_or_blank_value_means_no_data_yet() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        assert!(load_week(&store).unwrap().is_none());

        store.set(STORAGE_KEY, "  \n").unwrap();
        assert!(load_week(&store).unwrap().is_none());
    }

    #[test]
    fn malformed_value_is_a_decode_error() {
        let store = MemoryStore::new();
        store.set(STORAGE_KEY, "{not json").unwrap();
        assert!(matches!(load_week(&store), Err(PersistError::Decode(_))));
    }

    #[test]
    fn unavailable_store_maps_to_read_and_write_errors() {
        assert!(matches!(load_week(&BrokenStore), Err(PersistError::Read(_))));
        assert!(matches!(
            save_week(&BrokenStore, &WeekSchedule::new()),
            Err(PersistError::Write(_))
        ));
    }

    #[test]
    fn overwriting_keeps_only_latest_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path());
        save_week(&store, &sample_week()).unwrap();
        save_week(&store, &WeekSchedule::new()).unwrap();

        assert_eq!(load_week(&store).unwrap(), Some(WeekSchedule::new()));
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn background_round_trip_reports_over_channel() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (tx, rx) = channel();
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let persistence = Persistence::new(store, runtime.handle().clone(), tx, no_wake());

        let week = sample_week();
        persistence.save(week.clone());
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(5)).unwrap(),
            PersistEvent::Saved
        ));

        persistence.load();
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            PersistEvent::Loaded(Some(loaded)) => assert_eq!(loaded, week),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn background_failures_become_notices() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (tx, rx) = channel();
        let persistence = Persistence::new(Arc::new(BrokenStore), runtime.handle().clone(), tx, no_wake());

        persistence.load();
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            PersistEvent::LoadFailed(msg) => assert_eq!(msg, LOAD_FAILED_NOTICE),
            other => panic!("unexpected {:?}", other),
        }

        persistence.save(WeekSchedule::new());
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            PersistEvent::SaveFailed(msg) => assert_eq!(msg, SAVE_FAILED_NOTICE),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn every_result_wakes_the_ui_after_it_is_queued() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (tx, rx) = channel();
        let rx = Arc::new(std::sync::Mutex::new(rx));
        let wakes = Arc::new(AtomicUsize::new(0));
        let (seen_tx, seen_rx) = channel();

        let wake: Wake = {
            let rx = Arc::clone(&rx);
            let wakes = Arc::clone(&wakes);
            let seen_tx = std::sync::Mutex::new(seen_tx);
            Arc::new(move || {
                wakes.fetch_add(1, Ordering::SeqCst);
                let queued = rx.lock().unwrap().try_recv().is_ok();
                let _ = seen_tx.lock().unwrap().send(queued);
            })
        };
        let persistence = Persistence::new(Arc::new(MemoryStore::new()), runtime.handle().clone(), tx, wake);

        persistence.load();
        assert!(seen_rx.recv_timeout(Duration::from_secs(5)).unwrap());
        persistence.save(sample_week());
        assert!(seen_rx.recv_timeout(Duration::from_secs(5)).unwrap());
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }
}
