//! Core types for the equipment tracker.

use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an equipment record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquipmentId(pub u64);

impl EquipmentId {
    /// Id handed out when the store is empty.
    pub const FIRST: EquipmentId = EquipmentId(1);

    /// The following id, or `None` once the id space is used up.
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(EquipmentId)
    }
}

impl fmt::Debug for EquipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EquipmentId({})", self.0)
    }
}

impl fmt::Display for EquipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EquipmentId {
    fn from(id: u64) -> Self {
        EquipmentId(id)
    }
}

/// Operational status of a piece of equipment.
///
/// Serialized by symbolic name (`"NeedsMaintenance"`), never as a number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Operational,
    Inoperable,
    NeedsMaintenance,
    Unknown,
    Missing,
    Damaged,
}

impl Status {
    /// All statuses in menu order.
    pub const ALL: [Status; 6] = [
        Status::Operational,
        Status::Inoperable,
        Status::NeedsMaintenance,
        Status::Unknown,
        Status::Missing,
        Status::Damaged,
    ];

    /// Map a single-character selector (case-insensitive) to a status.
    pub fn from_selector(selector: char) -> Result<Self> {
        match selector.to_ascii_uppercase() {
            'O' => Ok(Status::Operational),
            'I' => Ok(Status::Inoperable),
            'N' => Ok(Status::NeedsMaintenance),
            'U' => Ok(Status::Unknown),
            'M' => Ok(Status::Missing),
            'D' => Ok(Status::Damaged),
            _ => Err(TrackerError::InvalidStatus(selector.to_string())),
        }
    }

    /// Map selector text to a status. Surrounding whitespace is ignored;
    /// anything other than exactly one character is rejected.
    pub fn parse_selector(input: &str) -> Result<Self> {
        let mut chars = input.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_selector(c),
            _ => Err(TrackerError::InvalidStatus(input.to_string())),
        }
    }

    /// Upper-case selector character for this status.
    pub fn selector(self) -> char {
        match self {
            Status::Operational => 'O',
            Status::Inoperable => 'I',
            Status::NeedsMaintenance => 'N',
            Status::Unknown => 'U',
            Status::Missing => 'M',
            Status::Damaged => 'D',
        }
    }

    /// Symbolic name, as stored in the backing file.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Operational => "Operational",
            Status::Inoperable => "Inoperable",
            Status::NeedsMaintenance => "NeedsMaintenance",
            Status::Unknown => "Unknown",
            Status::Missing => "Missing",
            Status::Damaged => "Damaged",
        }
    }

    /// Human-readable menu label.
    pub fn label(self) -> &'static str {
        match self {
            Status::NeedsMaintenance => "Needs Maintenance",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything a caller may hand in as a status: a resolved [`Status`], a
/// selector character, or selector text.
pub trait StatusInput {
    fn into_status(self) -> Result<Status>;
}

impl StatusInput for Status {
    fn into_status(self) -> Result<Status> {
        Ok(self)
    }
}

impl StatusInput for char {
    fn into_status(self) -> Result<Status> {
        Status::from_selector(self)
    }
}

impl StatusInput for &str {
    fn into_status(self) -> Result<Status> {
        Status::parse_selector(self)
    }
}

/// A tracked piece of equipment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// Unique identifier (assigned by the store).
    pub id: EquipmentId,

    /// Current operational status.
    pub status: Status,

    /// Name given at creation.
    pub name: String,
}

impl Equipment {
    /// Build a record, trimming and validating the name.
    pub fn new(id: EquipmentId, name: &str, status: Status) -> Result<Self> {
        let name = validate_name(name)?;
        Ok(Self {
            id,
            status,
            name: name.to_string(),
        })
    }
}

/// Returns the trimmed name, or `InvalidInput` if nothing is left.
pub fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::InvalidInput(
            "The name of the equipment cannot be empty.".into(),
        ));
    }
    Ok(trimmed)
}

/// Outcome of a status update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusChange {
    pub id: EquipmentId,
    pub old: Status,
    pub new: Status,
}
