//! # Pantry Core
//!
//! A local ingredient inventory library designed for FFI integration with mobile
//! and desktop shells. The full collection lives in memory and is persisted as a
//! single JSON blob in LMDB after every change.
//!
//! ## Features
//!
//! - **Ingredient records**: name, category, quantity and unit, optional expiry date and notes
//! - **Expiry tracking**: "expiring soon" (within 3 days) and "expired" classification
//! - **Search and filter**: case-insensitive name search combined with a category filter
//! - **Flush on every mutation**: storage never lags memory once a call returns `Ok`
//! - **Safe error handling**: no `unwrap()` calls in production code
//!
//! ## Quick Start
//!
//! ```no_run
//! use pantry_core::{IngredientStore, LocalDbState, PantryConfig};
//! use pantry_core::ingredient_model::{IngredientCategory, IngredientFormData};
//!
//! let storage = LocalDbState::init(&PantryConfig::new("my_pantry"))?;
//! let mut store = IngredientStore::open(storage)?;
//!
//! let id = store.add_ingredient(IngredientFormData {
//!     name: "Milk".to_string(),
//!     category: IngredientCategory::Dairy,
//!     quantity: 1.0,
//!     unit: "l".to_string(),
//!     ..IngredientFormData::default()
//! })?;
//!
//! assert!(store.get_ingredient_by_id(&id).is_some());
//! store.close()?;
//! # Ok::<(), pantry_core::PantryError>(())
//! ```
//!
//! ## FFI Functions
//!
//! Every function except [`create_pantry`] returns a JSON-serialized
//! [`AppResponse`](app_response::AppResponse) as a C string, to be released
//! with [`free_response`]:
//!
//! - [`create_pantry`] - Open (or create) a pantry and hydrate it
//! - [`add_ingredient`] - Validate form data and add a record
//! - [`update_ingredient`] - Validate form data and update a record by ID
//! - [`delete_ingredient`] - Remove a record by ID
//! - [`get_ingredient_by_id`] - Retrieve one record
//! - [`get_all_ingredients`] - Retrieve the collection in order
//! - [`filter_ingredients`] - Search by name and filter by category
//! - [`get_expiry_summary`] - Counts of expiring and expired records
//! - [`get_categories`] / [`get_unit_suggestions`] - Picker contents
//! - [`get_storage_status`] - Hydration fault and unsaved-change state
//! - [`flush_pantry`] - Retry a failed save
//! - [`clear_pantry`] - Remove every record
//! - [`close_pantry`] - Flush, close storage and free the handle

pub mod app_response;
pub mod error;
pub mod expiry;
pub mod ingredient_filter;
pub mod ingredient_model;
pub mod ingredient_store;
pub mod local_db_state;
pub mod pantry_config;

pub use crate::error::{PantryError, Result};
pub use crate::ingredient_store::{CloseError, IngredientStore};
pub use crate::local_db_state::{IngredientStorage, LocalDbState, MemoryStorage};
pub use crate::pantry_config::PantryConfig;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};

use crate::app_response::AppResponse;
use crate::ingredient_filter::CategoryFilter;
use crate::ingredient_model::{category_options, IngredientFormData, UNIT_SUGGESTIONS};

/// The store type handed across the C ABI.
pub type PantryStore = IngredientStore<LocalDbState>;

/// Opens the pantry with the given name and hydrates it from storage.
///
/// The LMDB environment is created as a directory named `{name}.lmdb`. If the
/// stored collection is unreadable the pantry still opens, empty; the fault is
/// reported by [`get_storage_status`].
///
/// # Returns
///
/// A pointer to the [`PantryStore`], or null if the name is invalid or the
/// storage cannot be opened. Release it with [`close_pantry`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use pantry_core::create_pantry;
///
/// let name = CString::new("kitchen").unwrap();
/// let pantry = create_pantry(name.as_ptr());
/// assert!(!pantry.is_null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_pantry(name: *const c_char) -> *mut PantryStore {
    if name.is_null() {
        warn!("Null name pointer passed to create_pantry");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    let config = PantryConfig::new(name_str);
    info!("Opening pantry at: {}", config.lmdb_dir().display());

    let storage = match LocalDbState::init(&config) {
        Ok(storage) => storage,
        Err(e) => {
            warn!("Failed to open pantry storage: {e}");
            return std::ptr::null_mut();
        }
    };

    match IngredientStore::open(storage) {
        Ok(store) => {
            if let Some(fault) = store.hydration_fault() {
                warn!("Pantry opened without stored data: {fault}");
            }
            Box::into_raw(Box::new(store))
        }
        Err(e) => {
            warn!("Failed to hydrate pantry: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Adds an ingredient from form JSON.
///
/// # JSON Format
///
/// ```json
/// {
///   "name": "Milk",
///   "category": "dairy",
///   "quantity": 1,
///   "unit": "l",
///   "expiryDate": "2024-01-15",
///   "notes": "semi-skimmed"
/// }
/// ```
///
/// On success the response carries the created record, including its new `id`.
/// Invalid fields come back together in a `ValidationError` response.
///
/// If the record was added but the save that followed failed, the response is
/// still `Ok` with the record, so the host never resubmits it under a new id.
/// [`get_storage_status`] then reports `unsavedChanges: true` until a later
/// save succeeds.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_pantry`]
/// * `form_ptr` - Null-terminated C string containing the form JSON
///
/// # Safety
///
/// `state` must be a live pointer from [`create_pantry`]. The form string must
/// be valid UTF-8.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_ingredient(state: *mut PantryStore, form_ptr: *const c_char) -> *const c_char {
    let store = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to add_ingredient"),
    };

    let form = match parse_form(form_ptr) {
        Ok(form) => form,
        Err(err) => return err,
    };

    response_to_c_string(&add_response(store, form))
}

// A record that was added but not saved is still reported, so the host keeps its id.
pub(crate) fn add_response<S: IngredientStorage>(
    store: &mut IngredientStore<S>,
    form: IngredientFormData,
) -> AppResponse {
    let id = match store.add_ingredient(form) {
        Ok(id) => id,
        Err(e) => match e.unsaved_id().map(str::to_string) {
            Some(id) => {
                warn!("{e}");
                id
            }
            None => return AppResponse::from(e),
        },
    };

    match store.get_ingredient_by_id(&id) {
        Some(ingredient) => AppResponse::json(ingredient),
        None => AppResponse::NotFound(format!("No ingredient found with id: {id}")),
    }
}

/// Updates the ingredient with `id` from form JSON (same format as
/// [`add_ingredient`]). Responds with the updated record, or `NotFound`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_ingredient(
    state: *mut PantryStore,
    id: *const c_char,
    form_ptr: *const c_char,
) -> *const c_char {
    let store = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to update_ingredient"),
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    let form = match parse_form(form_ptr) {
        Ok(form) => form,
        Err(err) => return err,
    };

    match store.update_ingredient(&id_str, form) {
        Ok(updated) => response_to_c_string(&AppResponse::json(updated)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Deletes the ingredient with `id`. Deleting an unknown id succeeds.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_ingredient(state: *mut PantryStore, id: *const c_char) -> *const c_char {
    let store = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to delete_ingredient"),
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match store.delete_ingredient(&id_str) {
        Ok(true) => response_to_c_string(&AppResponse::success("Ingredient deleted successfully")),
        Ok(false) => response_to_c_string(&AppResponse::success("No ingredient to delete")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Retrieves one ingredient by its ID.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_pantry`]
/// * `id` - Null-terminated C string containing the ingredient ID
///
/// # Returns
///
/// A JSON-formatted C string with the record if found, or a `NotFound`
/// response. Free it with [`free_response`].
///
/// # Safety
///
/// Both parameters must be valid pointers. The ID string must be valid UTF-8.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_ingredient_by_id(state: *mut PantryStore, id: *const c_char) -> *const c_char {
    let store = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to get_ingredient_by_id"),
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(error_ptr) => return error_ptr,
    };

    match store.get_ingredient_by_id(&id_str) {
        Some(ingredient) => response_to_c_string(&AppResponse::json(ingredient)),
        None => response_to_c_string(&AppResponse::NotFound(format!("No ingredient found with id: {id_str}"))),
    }
}

/// Retrieves the whole collection in insertion order.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_pantry`]
///
/// # Returns
///
/// A JSON-formatted C string containing an array of every record, or an error
/// response on failure.
///
/// # Safety
///
/// The state parameter must be a valid pointer to a [`PantryStore`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_all_ingredients(state: *mut PantryStore) -> *const c_char {
    match unsafe { state.as_ref() } {
        Some(store) => response_to_c_string(&AppResponse::json(store.list())),
        None => bad_request("Null state pointer passed to get_all_ingredients"),
    }
}

/// Returns the records whose name contains `search` (case-insensitive) and
/// whose category matches `category`, which is `"all"` or a category value.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn filter_ingredients(
    state: *mut PantryStore,
    search: *const c_char,
    category: *const c_char,
) -> *const c_char {
    let store = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to filter_ingredients"),
    };

    let search_str = match c_ptr_to_string(search, "search") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let category_str = match c_ptr_to_string(category, "category") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let filter: CategoryFilter = match category_str.parse() {
        Ok(filter) => filter,
        Err(e) => return bad_request(&e),
    };

    response_to_c_string(&AppResponse::json(&store.filtered(&search_str, filter)))
}

/// Counts for the header badges, classified against the current time.
///
/// # Returns
///
/// A JSON-formatted C string such as
/// `{"total":5,"expiringSoon":1,"expired":2}`.
///
/// # Safety
///
/// The state parameter must be a valid pointer to a [`PantryStore`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_expiry_summary(state: *mut PantryStore) -> *const c_char {
    match unsafe { state.as_ref() } {
        Some(store) => response_to_c_string(&AppResponse::json(&store.expiry_summary())),
        None => bad_request("Null state pointer passed to get_expiry_summary"),
    }
}

/// Every category with its display label, e.g. `{"value":"dairy","label":"Dairy"}`.
#[no_mangle]
pub extern "C" fn get_categories() -> *const c_char {
    response_to_c_string(&AppResponse::json(&category_options()))
}

/// The suggested units for the quantity picker, as `{"value","label"}` pairs.
///
/// Units are free text, so any other unit is accepted too.
#[no_mangle]
pub extern "C" fn get_unit_suggestions() -> *const c_char {
    response_to_c_string(&AppResponse::json(&UNIT_SUGGESTIONS[..]))
}

/// Reports whether the pantry is in sync with storage.
///
/// # Returns
///
/// A JSON-formatted C string with `hydrated`, `ingredientCount`,
/// `unsavedChanges` and `hydrationFault`. A host shows a "data may not be
/// saved" warning while `unsavedChanges` is true or a fault is present.
///
/// # Safety
///
/// The state parameter must be a valid pointer to a [`PantryStore`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_storage_status(state: *mut PantryStore) -> *const c_char {
    match unsafe { state.as_ref() } {
        Some(store) => response_to_c_string(&AppResponse::json(&store.status())),
        None => bad_request("Null state pointer passed to get_storage_status"),
    }
}

/// Writes the in-memory collection to storage again, after a failed save.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn flush_pantry(state: *mut PantryStore) -> *const c_char {
    let store = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to flush_pantry"),
    };

    match store.flush() {
        Ok(()) => response_to_c_string(&AppResponse::success("Pantry saved")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Removes every ingredient and the stored blob.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_pantry(state: *mut PantryStore) -> *const c_char {
    let store = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return bad_request("Null state pointer passed to clear_pantry"),
    };

    match store.clear_all() {
        Ok(count) => response_to_c_string(&AppResponse::success(format!("Cleared {count} ingredients"))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Flushes pending changes, closes the LMDB environment and frees the handle.
///
/// If pending changes cannot be saved, the error is returned and nothing is
/// freed: the pointer stays valid so the host can retry or read the data out.
/// On any other response the pointer must not be used again.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_pantry(state: *mut PantryStore) -> *const c_char {
    let pending = match unsafe { state.as_mut() } {
        Some(store) => store,
        None => return bad_request("Null state pointer passed to close_pantry"),
    };

    if pending.has_unsaved_changes() {
        if let Err(e) = pending.flush() {
            warn!("Pantry left open, final save failed: {e}");
            return response_to_c_string(&AppResponse::from(e));
        }
    }

    let store = unsafe { Box::from_raw(state) };

    match store.close() {
        Ok(_) => response_to_c_string(&AppResponse::success("Pantry closed successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(PantryError::from(e))),
    }
}

/// Releases a string returned by any of the functions above.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(ptr as *mut c_char));
    }
}

fn parse_form(ptr: *const c_char) -> std::result::Result<IngredientFormData, *const c_char> {
    let json_str = c_ptr_to_string(ptr, "JSON")?;
    serde_json::from_str(&json_str).map_err(|e| {
        let error = AppResponse::SerializationError(format!("Invalid ingredient JSON: {e}"));
        response_to_c_string(&error)
    })
}

fn bad_request(msg: &str) -> *const c_char {
    warn!("{msg}");
    response_to_c_string(&AppResponse::BadRequest(msg.to_string()))
}

/// Serializes the response to JSON and hands it out as an owned C string.
///
/// Returns null if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to an owned `String`.
///
/// On a null pointer or invalid UTF-8 the error side carries a ready-made
/// `BadRequest` response naming `field_name`.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> std::result::Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
