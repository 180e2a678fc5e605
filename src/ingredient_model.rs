//! Data model definitions for pantry entries.
//!
//! This module defines the record stored for every ingredient, the closed set of
//! categories an ingredient may belong to, and the form payload the presentation
//! layer submits when creating or editing an entry. The primary model is
//! [`Ingredient`]; new records are built from an [`IngredientFormData`] through
//! [`Ingredient::create`].
//!
//! # Persisted shape
//!
//! Records serialize to camelCase JSON. Optional fields are omitted when absent:
//!
//! ```json
//! {
//!   "id": "0b6f3c1e-8f4f-4d7c-9a55-2f0f9b1e7c3a",
//!   "name": "Milk",
//!   "category": "dairy",
//!   "quantity": 1.0,
//!   "unit": "l",
//!   "expiryDate": "2024-01-15",
//!   "createdAt": "2024-01-12T09:30:00Z"
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// The fixed set of pantry categories.
///
/// Serialized as the lowercase category name. Deserializing any other string
/// fails, so a stored record can never carry an unrecognized category.
///
/// ```rust
/// use pantry_core::ingredient_model::IngredientCategory;
///
/// let category: IngredientCategory = "dairy".parse().unwrap();
/// assert_eq!(category, IngredientCategory::Dairy);
/// assert_eq!(category.label(), "Dairy");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Produce,
    Dairy,
    Protein,
    Grains,
    Spices,
    Baking,
    Frozen,
    Canned,
    #[default]
    Other,
}

impl IngredientCategory {
    /// Every category, in display order.
    pub const ALL: [IngredientCategory; 9] = [
        IngredientCategory::Produce,
        IngredientCategory::Dairy,
        IngredientCategory::Protein,
        IngredientCategory::Grains,
        IngredientCategory::Spices,
        IngredientCategory::Baking,
        IngredientCategory::Frozen,
        IngredientCategory::Canned,
        IngredientCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Produce => "produce",
            IngredientCategory::Dairy => "dairy",
            IngredientCategory::Protein => "protein",
            IngredientCategory::Grains => "grains",
            IngredientCategory::Spices => "spices",
            IngredientCategory::Baking => "baking",
            IngredientCategory::Frozen => "frozen",
            IngredientCategory::Canned => "canned",
            IngredientCategory::Other => "other",
        }
    }

    /// Human-readable label: the value with its first letter capitalized.
    pub fn label(&self) -> String {
        let value = self.as_str();
        let mut chars = value.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl Display for IngredientCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IngredientCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IngredientCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {s}"))
    }
}

/// A category value paired with its display label, for pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    pub value: IngredientCategory,
    pub label: String,
}

/// All categories with their labels.
pub fn category_options() -> Vec<CategoryOption> {
    IngredientCategory::ALL
        .iter()
        .map(|c| CategoryOption {
            value: *c,
            label: c.label(),
        })
        .collect()
}

/// A suggested unit for the quantity picker. Units stay free-form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitSuggestion {
    pub value: &'static str,
    pub label: &'static str,
}

pub const UNIT_SUGGESTIONS: [UnitSuggestion; 14] = [
    UnitSuggestion { value: "unit", label: "Unit" },
    UnitSuggestion { value: "g", label: "Grams (g)" },
    UnitSuggestion { value: "kg", label: "Kilograms (kg)" },
    UnitSuggestion { value: "ml", label: "Milliliters (ml)" },
    UnitSuggestion { value: "l", label: "Liters (l)" },
    UnitSuggestion { value: "tsp", label: "Teaspoon (tsp)" },
    UnitSuggestion { value: "tbsp", label: "Tablespoon (tbsp)" },
    UnitSuggestion { value: "cup", label: "Cup" },
    UnitSuggestion { value: "oz", label: "Ounce (oz)" },
    UnitSuggestion { value: "lb", label: "Pound (lb)" },
    UnitSuggestion { value: "bunch", label: "Bunch" },
    UnitSuggestion { value: "piece", label: "Piece" },
    UnitSuggestion { value: "slice", label: "Slice" },
    UnitSuggestion { value: "clove", label: "Clove" },
];

/// The payload submitted by the add/edit form.
///
/// Not validated on construction; the store checks it before any mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientFormData {
    pub name: String,
    pub category: IngredientCategory,
    pub quantity: f64,
    pub unit: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Default for IngredientFormData {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: IngredientCategory::Other,
            quantity: 1.0,
            unit: "unit".to_string(),
            expiry_date: None,
            notes: None,
        }
    }
}

/// One pantry entry.
///
/// `id` and `created_at` are fixed at creation. `updated_at` stays `None`
/// until the first successful update.
///
/// ```rust
/// use pantry_core::ingredient_model::{Ingredient, IngredientCategory, IngredientFormData};
///
/// let form = IngredientFormData {
///     name: "Flour".to_string(),
///     category: IngredientCategory::Baking,
///     quantity: 2.0,
///     unit: "kg".to_string(),
///     ..IngredientFormData::default()
/// };
///
/// let flour = Ingredient::create(form);
/// assert!(!flour.id.is_empty());
/// assert!(flour.updated_at.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub category: IngredientCategory,
    pub quantity: f64,
    pub unit: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ingredient {
    /// Builds a new record from form data, stamped with the current time.
    pub fn create(form: IngredientFormData) -> Self {
        Self::create_at(form, Utc::now())
    }

    /// Builds a new record with an explicit creation time.
    pub fn create_at(form: IngredientFormData, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_id(),
            name: form.name,
            category: form.category,
            quantity: form.quantity,
            unit: form.unit,
            expiry_date: form.expiry_date,
            notes: normalize_notes(form.notes),
            created_at: now,
            updated_at: None,
        }
    }

    /// Overwrites the form-editable fields and stamps `updated_at`.
    pub(crate) fn apply_form(&mut self, form: IngredientFormData, now: DateTime<Utc>) {
        self.name = form.name;
        self.category = form.category;
        self.quantity = form.quantity;
        self.unit = form.unit;
        self.expiry_date = form.expiry_date;
        self.notes = normalize_notes(form.notes);
        self.updated_at = Some(now);
    }

    /// The editable fields of this record, for prefilling the edit form.
    pub fn to_form_data(&self) -> IngredientFormData {
        IngredientFormData {
            name: self.name.clone(),
            category: self.category,
            quantity: self.quantity,
            unit: self.unit.clone(),
            expiry_date: self.expiry_date,
            notes: self.notes.clone(),
        }
    }
}

/// Random v4 UUID; collisions are not a practical concern on one device.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}

// Date inputs submit "" when cleared. Anything other than a plain calendar
// date is rejected rather than narrowed, so a time of day is never dropped.
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let value = match raw.as_deref().map(str::trim) {
        None | Some("") => return Ok(None),
        Some(value) => value,
    };

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("invalid expiry date '{value}', expected YYYY-MM-DD: {e}")))
}
