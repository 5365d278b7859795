//! The record store: one JSON file holding the whole equipment collection.
//!
//! A [`Store`] lives for exactly one operation. It is built by reading the
//! backing file in full and, if the operation mutates anything, written back
//! in full. Nothing is cached between operations.

use crate::error::{Result, TrackerError};
use crate::types::{Equipment, EquipmentId};
use fs2::FileExt;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory under the project root that holds the data file.
pub const DATA_DIR: &str = "data";

/// File name of the backing artifact.
pub const DATA_FILE: &str = "equipment.json";

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Path of the backing JSON file.
    pub path: PathBuf,

    /// Hold an advisory lock on `<path>.lock` for each load/save cycle.
    pub lock: bool,

    /// Write to a temporary sibling file and rename it into place.
    pub atomic_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".").join(DATA_DIR).join(DATA_FILE),
            lock: true,
            atomic_writes: true,
        }
    }
}

impl StoreConfig {
    /// Config for an explicit file path, other settings default.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Config for the conventional `<root>/data/equipment.json` location.
    pub fn for_project(root: impl AsRef<Path>) -> Self {
        Self::new(root.as_ref().join(DATA_DIR).join(DATA_FILE))
    }

    /// Path of the sidecar lock file.
    pub fn lock_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".lock")
    }

    fn temp_path(&self) -> PathBuf {
        sibling_with_suffix(&self.path, ".tmp")
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// In-memory equipment collection bound to its backing file.
#[derive(Debug)]
pub struct Store {
    config: StoreConfig,
    records: Vec<Equipment>,
}

impl Store {
    /// Load the collection from the backing file.
    ///
    /// A missing or unreadable file is `StorageUnavailable`. An empty file or
    /// a JSON `null` yields an empty collection.
    pub fn load(config: StoreConfig) -> Result<Self> {
        let bytes = fs::read(&config.path)
            .map_err(|e| TrackerError::unavailable(&config.path, e))?;

        let records = decode(&bytes)?;
        verify(&records)?;

        debug!(path = %config.path.display(), count = records.len(), "loaded store");

        Ok(Self { config, records })
    }

    /// Create the data directory and an empty backing file if the file does
    /// not exist yet, then load it. An existing file is left untouched.
    pub fn initialize(config: StoreConfig) -> Result<Self> {
        if !config.path.exists() {
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }

            let _lock = StoreLock::exclusive_unchecked(&config)?;
            if !config.path.exists() {
                let store = Self {
                    config: config.clone(),
                    records: Vec::new(),
                };
                store.save()?;
                debug!(path = %config.path.display(), "initialized empty store");
            }
        }

        Self::load(config)
    }

    /// Build a store from records already in memory. Nothing is read; the
    /// records must satisfy the same invariants a loaded file does.
    pub fn with_records(config: StoreConfig, records: Vec<Equipment>) -> Result<Self> {
        verify(&records)?;
        Ok(Self { config, records })
    }

    /// Serialize the whole collection and overwrite the backing file.
    pub fn save(&self) -> Result<()> {
        let bytes = encode(&self.records)?;

        if self.config.atomic_writes {
            let tmp = self.config.temp_path();
            let written = write_synced(&tmp, &bytes)
                .and_then(|()| fs::rename(&tmp, &self.config.path).map_err(Into::into));
            if written.is_err() {
                let _ = fs::remove_file(&tmp);
            }
            written?;
        } else {
            write_synced(&self.config.path, &bytes)?;
        }

        debug!(
            path = %self.config.path.display(),
            count = self.records.len(),
            bytes = bytes.len(),
            "saved store"
        );
        Ok(())
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[Equipment] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Equipment> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Id the next created record receives: highest existing id plus one,
    /// or 1 for an empty store. Fails with `Corruption` when the highest id
    /// is already `u64::MAX`.
    pub fn next_id(&self) -> Result<EquipmentId> {
        match self.records.iter().map(|r| r.id).max() {
            None => Ok(EquipmentId::FIRST),
            Some(max) => max.checked_next().ok_or_else(|| {
                TrackerError::Corruption(format!("id space exhausted after {}", max))
            }),
        }
    }

    pub fn get(&self, id: EquipmentId) -> Option<&Equipment> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: EquipmentId) -> Option<&mut Equipment> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Append a record. Rejects an id that is already taken.
    pub fn push(&mut self, record: Equipment) -> Result<()> {
        if self.get(record.id).is_some() {
            return Err(TrackerError::Corruption(format!(
                "duplicate equipment id {}",
                record.id
            )));
        }
        self.records.push(record);
        Ok(())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }
}

fn decode(bytes: &[u8]) -> Result<Vec<Equipment>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let records: Option<Vec<Equipment>> = serde_json::from_slice(bytes)
        .map_err(|e| TrackerError::Deserialization(e.to_string()))?;

    Ok(records.unwrap_or_default())
}

fn encode(records: &[Equipment]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

fn verify(records: &[Equipment]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if record.id.0 == 0 {
            return Err(TrackerError::Corruption("equipment id 0 is not allowed".into()));
        }
        if !seen.insert(record.id) {
            return Err(TrackerError::Corruption(format!(
                "duplicate equipment id {}",
                record.id
            )));
        }
        if record.name.trim().is_empty() {
            return Err(TrackerError::Corruption(format!(
                "equipment {} has an empty name",
                record.id
            )));
        }
    }
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

/// Advisory lock on the store's sidecar lock file, released on drop.
#[derive(Debug)]
pub(crate) struct StoreLock {
    _file: Option<File>,
}

impl StoreLock {
    /// Single-writer lock for a mutating cycle.
    pub(crate) fn exclusive(config: &StoreConfig) -> Result<Self> {
        Self::acquire(config, true)
    }

    /// Reader lock for a query cycle.
    pub(crate) fn shared(config: &StoreConfig) -> Result<Self> {
        Self::acquire(config, false)
    }

    fn acquire(config: &StoreConfig, exclusive: bool) -> Result<Self> {
        // A missing artifact must not leave a lock file behind.
        if !config.path.is_file() {
            return Err(TrackerError::unavailable(
                &config.path,
                "the file does not exist or is not accessible",
            ));
        }
        if exclusive {
            Self::exclusive_unchecked(config)
        } else {
            Self::lock(config, false)
        }
    }

    fn exclusive_unchecked(config: &StoreConfig) -> Result<Self> {
        Self::lock(config, true)
    }

    fn lock(config: &StoreConfig, exclusive: bool) -> Result<Self> {
        if !config.lock {
            return Ok(Self { _file: None });
        }

        let lock_path = config.lock_path();
        let file = if exclusive {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&lock_path)?;
            file.lock_exclusive()?;
            file
        } else {
            // Readers never create the lock file. Without one (or without
            // access to it) no writer has run here yet, or the directory is
            // read-only; either way the read goes ahead unlocked.
            match File::open(&lock_path) {
                Ok(file) => {
                    file.lock_shared()?;
                    file
                }
                Err(e) => {
                    debug!(path = %lock_path.display(), error = %e, "reading without store lock");
                    return Ok(Self { _file: None });
                }
            }
        };

        debug!(path = %lock_path.display(), exclusive, "acquired store lock");
        Ok(Self { _file: Some(file) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> StoreConfig {
        StoreConfig::new(dir.path().join(DATA_FILE))
    }

    fn record(id: u64, name: &str, status: Status) -> Equipment {
        Equipment::new(EquipmentId(id), name, status).unwrap()
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Store::load(test_config(&dir));
        assert!(matches!(result, Err(TrackerError::StorageUnavailable { .. })));
    }

    #[test]
    fn test_load_empty_and_null() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        fs::write(&config.path, b"").unwrap();
        assert!(Store::load(config.clone()).unwrap().is_empty());

        fs::write(&config.path, b"  \n").unwrap();
        assert!(Store::load(config.clone()).unwrap().is_empty());

        fs::write(&config.path, b"null").unwrap();
        assert!(Store::load(config.clone()).unwrap().is_empty());

        fs::write(&config.path, b"[]").unwrap();
        assert!(Store::load(config).unwrap().is_empty());
    }

    #[test]
    fn test_load_malformed() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        fs::write(&config.path, b"{not json").unwrap();
        assert!(matches!(
            Store::load(config.clone()),
            Err(TrackerError::Deserialization(_))
        ));

        fs::write(
            &config.path,
            br#"[{"id": 1, "status": "Broken", "name": "Drill"}]"#,
        )
        .unwrap();
        assert!(matches!(
            Store::load(config),
            Err(TrackerError::Deserialization(_))
        ));
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        fs::write(
            &config.path,
            br#"[
                {"id": 1, "status": "Operational", "name": "Drill"},
                {"id": 1, "status": "Damaged", "name": "Hammer"}
            ]"#,
        )
        .unwrap();

        assert!(matches!(Store::load(config), Err(TrackerError::Corruption(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let store = Store::with_records(
            config.clone(),
            vec![
                record(1, "Drill", Status::Operational),
                record(2, "Hammer", Status::NeedsMaintenance),
            ],
        )
        .unwrap();
        store.save().unwrap();

        let text = fs::read_to_string(&config.path).unwrap();
        assert!(text.contains("\"NeedsMaintenance\""));
        assert!(!config.temp_path().exists());

        let loaded = Store::load(config).unwrap();
        assert_eq!(loaded.records(), store.records());
    }

    #[test]
    fn test_save_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        Store::with_records(config.clone(), vec![record(4, "Saw", Status::Missing)])
            .unwrap()
            .save()
            .unwrap();

        Store::load(config.clone()).unwrap().save().unwrap();
        let first = fs::read(&config.path).unwrap();
        Store::load(config.clone()).unwrap().save().unwrap();
        let second = fs::read(&config.path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_non_atomic_save() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig {
            atomic_writes: false,
            ..test_config(&dir)
        };

        Store::with_records(config.clone(), vec![record(1, "Drill", Status::Unknown)])
            .unwrap()
            .save()
            .unwrap();

        assert_eq!(Store::load(config).unwrap().len(), 1);
    }

    #[test]
    fn test_next_id() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let empty = Store::with_records(config.clone(), Vec::new()).unwrap();
        assert_eq!(empty.next_id().unwrap(), EquipmentId(1));

        let store = Store::with_records(
            config,
            vec![
                record(3, "Drill", Status::Operational),
                record(9, "Hammer", Status::Damaged),
                record(5, "Saw", Status::Unknown),
            ],
        )
        .unwrap();
        assert_eq!(store.next_id().unwrap(), EquipmentId(10));
    }

    #[test]
    fn test_push_rejects_taken_id() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::with_records(
            test_config(&dir),
            vec![record(1, "Drill", Status::Operational)],
        )
        .unwrap();

        let result = store.push(record(1, "Hammer", Status::Damaged));
        assert!(matches!(result, Err(TrackerError::Corruption(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_initialize() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::for_project(dir.path());
        assert!(!config.path.exists());

        let store = Store::initialize(config.clone()).unwrap();
        assert!(store.is_empty());
        assert!(config.path.exists());

        // Existing contents survive a second initialize.
        Store::with_records(config.clone(), vec![record(1, "Drill", Status::Operational)])
            .unwrap()
            .save()
            .unwrap();
        let store = Store::initialize(config).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lock_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let result = StoreLock::exclusive(&config);
        assert!(matches!(result, Err(TrackerError::StorageUnavailable { .. })));
        assert!(!config.lock_path().exists());

        fs::write(&config.path, b"[]").unwrap();
        let exclusive = StoreLock::exclusive(&config).unwrap();
        assert!(exclusive._file.is_some());
        assert!(config.lock_path().exists());
    }

    #[test]
    fn test_shared_lock_never_creates_file() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        fs::write(&config.path, b"[]").unwrap();

        let shared = StoreLock::shared(&config).unwrap();
        assert!(shared._file.is_none());
        assert!(!config.lock_path().exists());
        drop(shared);

        // Once a writer has created it, readers take it read-only.
        drop(StoreLock::exclusive(&config).unwrap());
        let shared = StoreLock::shared(&config).unwrap();
        assert!(shared._file.is_some());
    }

    #[test]
    fn test_next_id_exhausted() {
        let dir = TempDir::new().unwrap();
        let store = Store::with_records(
            test_config(&dir),
            vec![record(u64::MAX, "Drill", Status::Operational)],
        )
        .unwrap();

        assert!(matches!(store.next_id(), Err(TrackerError::Corruption(_))));
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the final rename fail.
        let config = test_config(&dir);
        fs::create_dir_all(&config.path).unwrap();

        let store = Store::with_records(config.clone(), vec![record(1, "Drill", Status::Operational)])
            .unwrap();
        assert!(store.save().is_err());
        assert!(!config.temp_path().exists());

        // Same when the temp file itself cannot be written.
        let config = StoreConfig::new(dir.path().join("missing").join(DATA_FILE));
        let store = Store::with_records(config.clone(), Vec::new()).unwrap();
        assert!(store.save().is_err());
        assert!(!config.temp_path().exists());
    }

    #[test]
    fn test_sidecar_paths() {
        let config = StoreConfig::for_project("/srv/tracker");
        assert_eq!(config.path, PathBuf::from("/srv/tracker/data/equipment.json"));
        assert_eq!(
            config.lock_path(),
            PathBuf::from("/srv/tracker/data/equipment.json.lock")
        );
        assert_eq!(
            config.temp_path(),
            PathBuf::from("/srv/tracker/data/equipment.json.tmp")
        );
    }
}
