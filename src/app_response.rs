use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::error::{FieldError, PantryError};

/// Envelope returned to the host across the C ABI, serialized as JSON.
#[derive(Debug, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(Vec<FieldError>),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(errors) => {
                let fields = errors
                    .iter()
                    .map(|e| format!("{} ({})", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Validation error: {}", fields)
            }
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl From<PantryError> for AppResponse {
    fn from(err: PantryError) -> Self {
        match err {
            PantryError::Validation(errors) => AppResponse::ValidationError(errors.errors),
            PantryError::NotFound(id) => AppResponse::NotFound(format!("No ingredient found with id: {id}")),
            PantryError::Serialization(e) => AppResponse::from(e),
            PantryError::Database(e) => AppResponse::from(e),
            e @ PantryError::NotHydrated => AppResponse::BadRequest(e.to_string()),
            other => AppResponse::DatabaseError(other.to_string()),
        }
    }
}

impl From<lmdb::Error> for AppResponse {
    fn from(err: lmdb::Error) -> Self {
        match err {
            lmdb::Error::NotFound => AppResponse::NotFound("Key not found in LMDB".to_string()),
            lmdb::Error::MapFull => AppResponse::DatabaseError("Storage is full".to_string()),
            lmdb::Error::Corrupted => AppResponse::DatabaseError("Database is corrupted".to_string()),
            _ => AppResponse::DatabaseError(format!("LMDB error: {}", err)),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    /// Serializes `value` and wraps it in [`AppResponse::Ok`].
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => AppResponse::Ok(json),
            Err(e) => AppResponse::from(e),
        }
    }
}
