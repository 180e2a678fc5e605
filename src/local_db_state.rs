//! Persistence of the ingredient collection.
//!
//! The whole collection is stored as one JSON blob under a single key. There is
//! no incremental persistence: [`IngredientStorage::save`] overwrites the blob and
//! [`IngredientStorage::load`] reads all of it back.
//!
//! Two backends are provided:
//!
//! - [`LocalDbState`]: an LMDB environment on disk, one named database, one entry.
//! - [`MemoryStorage`]: a process-local blob, for embedding without a filesystem
//!   and for isolated store instances in tests.

use std::fs;
use std::path::{Path, PathBuf};

use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::error::{PantryError, Result};
use crate::ingredient_model::Ingredient;
use crate::pantry_config::PantryConfig;

const DB_NAME: &str = "pantry";
const MAX_DBS: u32 = 2;

/// Synchronous whole-collection persistence.
pub trait IngredientStorage {
    /// Everything previously saved, in order. Empty if nothing was ever saved.
    ///
    /// Returns [`PantryError::StorageCorruption`] when a blob is present but
    /// does not decode as an ingredient collection.
    fn load(&mut self) -> Result<Vec<Ingredient>>;

    /// Replaces the persisted blob with `ingredients`.
    fn save(&mut self, ingredients: &[Ingredient]) -> Result<()>;

    /// Removes the persisted blob.
    fn clear(&mut self) -> Result<()>;

    /// Releases the underlying handle. Later calls fail with
    /// [`PantryError::StorageClosed`].
    fn close(&mut self) -> Result<()>;
}

pub(crate) fn encode_collection(ingredients: &[Ingredient]) -> Result<Vec<u8>> {
    serde_json::to_vec(ingredients).map_err(PantryError::from)
}

pub(crate) fn decode_collection(bytes: &[u8]) -> Result<Vec<Ingredient>> {
    serde_json::from_slice(bytes).map_err(|e| PantryError::StorageCorruption(e.to_string()))
}

/// LMDB-backed storage.
///
/// The environment is opened in [`LocalDbState::init`] and released either by
/// [`IngredientStorage::close`] or when the value is dropped.
pub struct LocalDbState {
    env: Option<Environment>,
    db: Database,
    path: PathBuf,
    storage_key: String,
    corrupt_key: String,
}

impl LocalDbState {
    pub fn init(config: &PantryConfig) -> Result<Self> {
        let path = config.lmdb_dir();
        fs::create_dir_all(&path)?;

        let env = Environment::new()
            .set_max_dbs(MAX_DBS)
            .set_map_size(config.map_size)
            .open(&path)?;
        let db = env.create_db(Some(DB_NAME), DatabaseFlags::empty())?;

        info!("Opened pantry storage at {}", path.display());

        Ok(Self {
            env: Some(env),
            db,
            path,
            storage_key: config.storage_key.clone(),
            corrupt_key: config.corrupt_key(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.env.is_some()
    }

    /// Raw bytes previously set aside by a corrupted load, if any.
    pub fn quarantined_blob(&self) -> Result<Option<Vec<u8>>> {
        self.read_raw(&self.corrupt_key)
    }

    fn env(&self) -> Result<&Environment> {
        self.env.as_ref().ok_or(PantryError::StorageClosed)
    }

    fn read_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let env = self.env()?;
        let txn = env.begin_ro_txn()?;
        let result = match txn.get(self.db, &key) {
            Ok(bytes) => Ok(Some(bytes.to_vec())),
            Err(lmdb::Error::NotFound) => Ok(None),
            Err(e) => Err(PantryError::from(e)),
        };
        txn.abort();
        result
    }

    pub(crate) fn write_raw(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let env = self.env()?;
        let mut txn = env.begin_rw_txn()?;
        txn.put(self.db, &key, &bytes, WriteFlags::empty())?;
        txn.commit()?;
        env.sync(true)?;
        Ok(())
    }
}

impl IngredientStorage for LocalDbState {
    fn load(&mut self) -> Result<Vec<Ingredient>> {
        let bytes = match self.read_raw(&self.storage_key)? {
            Some(bytes) => bytes,
            None => {
                debug!("No stored ingredients under '{}'", self.storage_key);
                return Ok(Vec::new());
            }
        };

        match decode_collection(&bytes) {
            Ok(ingredients) => Ok(ingredients),
            Err(e) => {
                warn!("Stored ingredients are unreadable: {e}");
                if let Err(quarantine_err) = self.write_raw(&self.corrupt_key, &bytes) {
                    warn!("Could not set aside corrupted blob: {quarantine_err}");
                } else {
                    info!("Corrupted blob copied to '{}'", self.corrupt_key);
                }
                Err(e)
            }
        }
    }

    fn save(&mut self, ingredients: &[Ingredient]) -> Result<()> {
        let bytes = encode_collection(ingredients)?;
        match self.write_raw(&self.storage_key, &bytes) {
            Ok(()) => {
                debug!("Saved {} ingredients", ingredients.len());
                Ok(())
            }
            Err(PantryError::StorageClosed) => Err(PantryError::StorageClosed),
            Err(e) => Err(PantryError::StorageWrite(e.to_string())),
        }
    }

    fn clear(&mut self) -> Result<()> {
        let env = self.env()?;
        let mut txn = env.begin_rw_txn()?;
        match txn.del(self.db, &self.storage_key, None) {
            Ok(()) | Err(lmdb::Error::NotFound) => {}
            Err(e) => return Err(PantryError::from(e)),
        }
        txn.commit()?;
        env.sync(true)?;
        info!("Cleared stored ingredients");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.env.take() {
            Some(env) => {
                drop(env);
                info!("Closed pantry storage at {}", self.path.display());
                Ok(())
            }
            None => Err(PantryError::StorageClosed),
        }
    }
}

/// In-process storage holding the serialized blob in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: Option<Vec<u8>>,
    closed: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing serialized blob, as if previously saved.
    pub fn with_blob(blob: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Some(blob.into()),
            closed: false,
        }
    }

    pub fn blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(PantryError::StorageClosed)
        } else {
            Ok(())
        }
    }
}

impl IngredientStorage for MemoryStorage {
    fn load(&mut self) -> Result<Vec<Ingredient>> {
        self.ensure_open()?;
        match &self.blob {
            Some(bytes) => decode_collection(bytes),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, ingredients: &[Ingredient]) -> Result<()> {
        self.ensure_open()?;
        self.blob = Some(encode_collection(ingredients)?);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.blob = None;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }
}
