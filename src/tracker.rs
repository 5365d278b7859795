//! Tracker facade: one load/operate/save cycle per call.

use crate::error::Result;
use crate::records;
use crate::store::{Store, StoreConfig, StoreLock};
use crate::types::{validate_name, Equipment, EquipmentId, Status, StatusChange, StatusInput};
use tracing::{info, warn};

/// Entry point for callers.
///
/// Holds only configuration. Every operation reloads the backing file, so
/// changes made through another `Tracker` (or by hand) are always seen.
#[derive(Clone, Debug)]
pub struct Tracker {
    config: StoreConfig,
}

impl Tracker {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Provision an empty backing file if none exists.
    ///
    /// The record operations never do this themselves: a missing file is
    /// always reported as `StorageUnavailable`.
    pub fn initialize(&self) -> Result<()> {
        let store = Store::initialize(self.config.clone())?;
        info!(path = %store.path().display(), count = store.len(), "store ready");
        Ok(())
    }

    /// Register a new piece of equipment.
    ///
    /// Name and status are checked before the file is touched, so bad input
    /// is reported ahead of storage errors. `records::create_record` checks
    /// them again for callers that use it directly.
    pub fn create_record(&self, name: &str, status: impl StatusInput) -> Result<Equipment> {
        let name = validate_name(name).inspect_err(|e| warn!(error = %e, "rejected name"))?;
        let status = status
            .into_status()
            .inspect_err(|e| warn!(error = %e, "rejected status"))?;

        let record = self.mutate(|store| records::create_record(store, name, status))?;
        info!(id = %record.id, name = %record.name, status = %record.status, "created equipment");
        Ok(record)
    }

    /// Change the status of an existing record.
    pub fn update_status(&self, id: EquipmentId, status: impl StatusInput) -> Result<StatusChange> {
        let change = self.mutate(|store| records::update_status(store, id, status))?;
        info!(id = %id, old = %change.old, new = %change.new, "updated status");
        Ok(change)
    }

    pub fn get_status(&self, id: EquipmentId) -> Result<Status> {
        self.read(|store| records::get_status(store, id))
    }

    pub fn get_record(&self, id: EquipmentId) -> Result<Equipment> {
        self.read(|store| records::get_record(store, id).cloned())
    }

    /// Ids of records whose name or status matches `term`.
    pub fn search(&self, term: &str) -> Result<Vec<EquipmentId>> {
        self.read(|store| records::search(store, term))
    }

    pub fn list_records(&self) -> Result<Vec<Equipment>> {
        self.read(|store| Ok(records::list_records(store)))
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut Store) -> Result<T>) -> Result<T> {
        let _lock = StoreLock::exclusive(&self.config)?;
        let mut store = Store::load(self.config.clone())?;
        let out = op(&mut store)?;
        store.save()?;
        Ok(out)
    }

    fn read<T>(&self, op: impl FnOnce(&Store) -> Result<T>) -> Result<T> {
        let _lock = StoreLock::shared(&self.config)?;
        let store = Store::load(self.config.clone())?;
        op(&store)
    }
}
