//! The canonical in-memory ingredient collection.
//!
//! [`IngredientStore`] owns the collection and its storage backend. It is
//! hydrated once from storage, and every successful mutation flushes the full
//! collection back before returning. When a flush fails the in-memory change is
//! kept, the store is marked as having unsaved changes, and the write error is
//! returned so the caller can warn that data may not be saved. A failed add
//! reports [`PantryError::Unsaved`] carrying the new id, so the caller can keep
//! referring to the record instead of submitting it again.

use std::fmt::{Debug, Formatter};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{PantryError, Result, ValidationErrors};
use crate::expiry::ExpirySummary;
use crate::ingredient_filter::{filter_ingredients, CategoryFilter};
use crate::ingredient_model::{Ingredient, IngredientFormData};
use crate::local_db_state::IngredientStorage;

/// Checks every rule and reports all violations together.
pub fn validate_form(form: &IngredientFormData) -> std::result::Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if form.name.trim().is_empty() {
        errors.push("name", "Name is required");
    }
    // NaN and infinities fail too; neither survives a JSON round-trip
    if !(form.quantity.is_finite() && form.quantity > 0.0) {
        errors.push("quantity", "Quantity must be greater than 0");
    }
    if form.unit.trim().is_empty() {
        errors.push("unit", "Unit is required");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Snapshot of the store's health, for "data may not be saved" messaging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub hydrated: bool,
    pub ingredient_count: usize,
    pub unsaved_changes: bool,
    pub hydration_fault: Option<String>,
}

pub struct IngredientStore<S: IngredientStorage> {
    storage: S,
    ingredients: Vec<Ingredient>,
    hydrated: bool,
    dirty: bool,
    hydration_fault: Option<PantryError>,
}

impl<S: IngredientStorage> IngredientStore<S> {
    /// A store that has not loaded anything yet. `list()` is empty and
    /// mutations fail with [`PantryError::NotHydrated`] until [`hydrate`] runs.
    ///
    /// [`hydrate`]: IngredientStore::hydrate
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            ingredients: Vec::new(),
            hydrated: false,
            dirty: false,
            hydration_fault: None,
        }
    }

    /// Creates a store and hydrates it from `storage`.
    pub fn open(storage: S) -> Result<Self> {
        let mut store = Self::new(storage);
        store.hydrate()?;
        Ok(store)
    }

    /// Loads the persisted collection. Runs once; later calls do nothing.
    ///
    /// A corrupted blob is not fatal: the store starts empty and the fault is
    /// kept in [`hydration_fault`](IngredientStore::hydration_fault). Any other
    /// storage error is returned and the store stays un-hydrated.
    pub fn hydrate(&mut self) -> Result<()> {
        if self.hydrated {
            return Ok(());
        }

        match self.storage.load() {
            Ok(ingredients) => {
                info!("Hydrated pantry with {} ingredients", ingredients.len());
                self.ingredients = ingredients;
            }
            Err(e @ PantryError::StorageCorruption(_)) => {
                warn!("Starting with an empty pantry: {e}");
                self.ingredients = Vec::new();
                self.hydration_fault = Some(e);
            }
            Err(e) => return Err(e),
        }

        self.hydrated = true;
        Ok(())
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// The fault hit while hydrating, if the stored blob was unreadable.
    pub fn hydration_fault(&self) -> Option<&PantryError> {
        self.hydration_fault.as_ref()
    }

    /// True when the last flush failed and memory is ahead of storage.
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            hydrated: self.hydrated,
            ingredient_count: self.ingredients.len(),
            unsaved_changes: self.dirty,
            hydration_fault: self.hydration_fault.as_ref().map(|e| e.to_string()),
        }
    }

    pub fn list(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    pub fn get_ingredient_by_id(&self, id: &str) -> Option<&Ingredient> {
        self.ingredients.iter().find(|i| i.id == id)
    }

    /// Validates `form`, appends a new record and flushes. Returns the new id.
    ///
    /// If the flush fails the record stays in [`list`](IngredientStore::list)
    /// and the error is [`PantryError::Unsaved`] with the same id.
    pub fn add_ingredient(&mut self, form: IngredientFormData) -> Result<String> {
        self.add_ingredient_at(form, Utc::now())
    }

    pub fn add_ingredient_at(&mut self, form: IngredientFormData, now: DateTime<Utc>) -> Result<String> {
        self.ensure_hydrated()?;
        validate_form(&form).map_err(PantryError::Validation)?;

        let ingredient = Ingredient::create_at(form, now);
        let id = ingredient.id.clone();
        debug!("Adding ingredient {id} ({})", ingredient.name);
        self.ingredients.push(ingredient);

        match self.persist() {
            Ok(()) => Ok(id),
            Err(PantryError::StorageClosed) => Err(PantryError::StorageClosed),
            Err(e) => Err(PantryError::Unsaved {
                id,
                reason: e.to_string(),
            }),
        }
    }

    /// Validates `form` and overwrites the matching record in place.
    pub fn update_ingredient(&mut self, id: &str, form: IngredientFormData) -> Result<&Ingredient> {
        self.update_ingredient_at(id, form, Utc::now())
    }

    pub fn update_ingredient_at(
        &mut self,
        id: &str,
        form: IngredientFormData,
        now: DateTime<Utc>,
    ) -> Result<&Ingredient> {
        self.ensure_hydrated()?;
        validate_form(&form).map_err(PantryError::Validation)?;

        let position = self
            .ingredients
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| PantryError::NotFound(id.to_string()))?;

        self.ingredients[position].apply_form(form, now);
        debug!("Updated ingredient {id}");

        self.persist()?;
        Ok(&self.ingredients[position])
    }

    /// Removes the record with `id`. An unknown id is not an error.
    ///
    /// Returns whether a record was removed. The collection is flushed either way.
    pub fn delete_ingredient(&mut self, id: &str) -> Result<bool> {
        self.ensure_hydrated()?;

        let before = self.ingredients.len();
        self.ingredients.retain(|i| i.id != id);
        let removed = self.ingredients.len() != before;
        if removed {
            debug!("Deleted ingredient {id}");
        } else {
            debug!("Delete of unknown ingredient {id} ignored");
        }

        self.persist()?;
        Ok(removed)
    }

    /// Empties the pantry and flushes. Returns how many records were removed.
    pub fn clear_all(&mut self) -> Result<usize> {
        self.ensure_hydrated()?;
        let count = self.ingredients.len();
        self.ingredients.clear();
        if let Err(e) = self.storage.clear() {
            warn!("Pantry reset may not be saved: {e}");
            self.dirty = true;
            return Err(e);
        }
        self.dirty = false;
        info!("Cleared {count} ingredients");
        Ok(count)
    }

    pub fn filtered(&self, search: &str, category: CategoryFilter) -> Vec<&Ingredient> {
        filter_ingredients(&self.ingredients, search, category)
    }

    pub fn expiry_summary(&self) -> ExpirySummary {
        ExpirySummary::compute_at(&self.ingredients, Utc::now())
    }

    pub fn expiry_summary_at(&self, now: DateTime<Utc>) -> ExpirySummary {
        ExpirySummary::compute_at(&self.ingredients, now)
    }

    /// Writes the current collection to storage, e.g. to retry a failed flush.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_hydrated()?;
        self.persist()
    }

    /// Flushes pending changes and releases the storage handle.
    ///
    /// On failure the store comes back inside the [`CloseError`], collection
    /// included, so a failed final save can be retried.
    pub fn close(mut self) -> std::result::Result<S, CloseError<S>> {
        if self.dirty {
            if let Err(error) = self.persist() {
                return Err(CloseError { error, store: self });
            }
        }
        if let Err(error) = self.storage.close() {
            return Err(CloseError { error, store: self });
        }
        Ok(self.storage)
    }

    fn ensure_hydrated(&self) -> Result<()> {
        if self.hydrated {
            Ok(())
        } else {
            Err(PantryError::NotHydrated)
        }
    }

    fn persist(&mut self) -> Result<()> {
        match self.storage.save(&self.ingredients) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                warn!("Pantry changes may not be saved: {e}");
                self.dirty = true;
                Err(e)
            }
        }
    }
}

/// A failed [`IngredientStore::close`], holding the store that could not be closed.
pub struct CloseError<S: IngredientStorage> {
    pub error: PantryError,
    pub store: IngredientStore<S>,
}

impl<S: IngredientStorage> CloseError<S> {
    pub fn into_store(self) -> IngredientStore<S> {
        self.store
    }
}

impl<S: IngredientStorage> Debug for CloseError<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloseError")
            .field("error", &self.error)
            .field("ingredient_count", &self.store.len())
            .finish()
    }
}

impl<S: IngredientStorage> From<CloseError<S>> for PantryError {
    fn from(err: CloseError<S>) -> Self {
        err.error
    }
}
