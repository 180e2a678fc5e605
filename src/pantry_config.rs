//! Storage configuration.

use std::path::PathBuf;

/// 10 MiB comfortably holds a household inventory blob.
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

/// Name of the single entry holding the serialized collection.
pub const DEFAULT_STORAGE_KEY: &str = "ingredients";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PantryConfig {
    /// Database name or path prefix; the LMDB directory is `{name}.lmdb`.
    pub name: String,
    pub map_size: usize,
    pub storage_key: String,
}

impl PantryConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            map_size: DEFAULT_MAP_SIZE,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    pub fn with_map_size(mut self, map_size: usize) -> Self {
        self.map_size = map_size;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn lmdb_dir(&self) -> PathBuf {
        PathBuf::from(format!("{}.lmdb", self.name))
    }

    /// Key under which an unreadable blob is set aside.
    pub fn corrupt_key(&self) -> String {
        format!("{}.corrupt", self.storage_key)
    }
}
