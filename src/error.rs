//! Error types for the pantry core.
//!
//! Every fallible operation in the crate returns [`PantryError`]. Validation
//! and not-found errors are recoverable and never touch state; storage errors
//! leave the in-memory collection authoritative.

use std::fmt::{Display, Formatter};
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for pantry operations
pub type Result<T> = std::result::Result<T, PantryError>;

#[derive(Debug, Error)]
pub enum PantryError {
    /// Form data rejected before any mutation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("No ingredient found with id: {0}")]
    NotFound(String),

    /// Persisted blob exists but is not a valid ingredient collection
    #[error("Stored ingredients are corrupted: {0}")]
    StorageCorruption(String),

    /// Persisting the collection failed; the in-memory state is kept
    #[error("Failed to save ingredients: {0}")]
    StorageWrite(String),

    /// A record was added in memory under `id` but the flush that followed failed
    #[error("Ingredient {id} was added but may not be saved: {reason}")]
    Unsaved { id: String, reason: String },

    #[error("LMDB error: {0}")]
    Database(#[from] lmdb::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store has not been hydrated from storage yet")]
    NotHydrated,

    #[error("Storage has been closed")]
    StorageClosed,
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All field errors found in one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message for `field`, if that field was rejected.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{joined}")
    }
}

impl PantryError {
    /// The id of a record that exists in memory despite this error, if any.
    pub fn unsaved_id(&self) -> Option<&str> {
        match self {
            PantryError::Unsaved { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Storage faults degrade to "data may not be saved"; the pantry stays usable.
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            PantryError::StorageCorruption(_)
                | PantryError::StorageWrite(_)
                | PantryError::Unsaved { .. }
                | PantryError::Database(_)
                | PantryError::Io(_)
                | PantryError::StorageClosed
        )
    }
}
