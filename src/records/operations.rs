//! Create, update and look up equipment records.

use crate::error::{Result, TrackerError};
use crate::store::Store;
use crate::types::{validate_name, Equipment, EquipmentId, Status, StatusChange, StatusInput};

/// Append a new record with the next free id.
///
/// The name is validated before the status so an empty name is reported
/// first, matching the order in which an operator supplies them.
pub fn create_record(store: &mut Store, name: &str, status: impl StatusInput) -> Result<Equipment> {
    let name = validate_name(name)?;
    let status = status.into_status()?;

    let record = Equipment {
        id: store.next_id()?,
        status,
        name: name.to_string(),
    };
    store.push(record.clone())?;

    Ok(record)
}

/// Set a record's status, returning the old and new values.
///
/// The record is located before the status input is resolved, so an unknown
/// id wins over an invalid selector.
pub fn update_status(
    store: &mut Store,
    id: EquipmentId,
    status: impl StatusInput,
) -> Result<StatusChange> {
    let record = store.get_mut(id).ok_or(TrackerError::RecordNotFound(id))?;
    let new = status.into_status()?;

    let old = record.status;
    record.status = new;

    Ok(StatusChange { id, old, new })
}

pub fn get_record(store: &Store, id: EquipmentId) -> Result<&Equipment> {
    store.get(id).ok_or(TrackerError::RecordNotFound(id))
}

pub fn get_status(store: &Store, id: EquipmentId) -> Result<Status> {
    get_record(store, id).map(|r| r.status)
}

/// All records in insertion order.
pub fn list_records(store: &Store) -> Vec<Equipment> {
    store.records().to_vec()
}
