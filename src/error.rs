//! Error types for the equipment tracker.

use crate::types::EquipmentId;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Storage unavailable at {path}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Record not found: {0}")]
    RecordNotFound(EquipmentId),

    #[error("Invalid status selection: {0:?}")]
    InvalidStatus(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("The search term cannot be empty")]
    EmptySearchTerm,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),
}

impl TrackerError {
    /// True for rejected caller input (`InvalidInput` and its search
    /// specialization `EmptySearchTerm`).
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            TrackerError::InvalidInput(_) | TrackerError::EmptySearchTerm
        )
    }

    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TrackerError::StorageUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        TrackerError::Serialization(e.to_string())
    }
}

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
