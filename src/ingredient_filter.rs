//! Search and category filtering for the ingredient list.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::ingredient_model::{Ingredient, IngredientCategory};

pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(IngredientCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: IngredientCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    /// `"all"` or a category value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_CATEGORIES {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL_CATEGORIES),
            CategoryFilter::Only(category) => write!(f, "{category}"),
        }
    }
}

/// Records whose name contains `search` (case-insensitive) and whose category
/// passes `category`, in collection order. An empty search matches every name.
pub fn filter_ingredients<'a>(
    ingredients: &'a [Ingredient],
    search: &str,
    category: CategoryFilter,
) -> Vec<&'a Ingredient> {
    let needle = search.to_lowercase();
    ingredients
        .iter()
        .filter(|i| category.matches(i.category))
        .filter(|i| i.name.to_lowercase().contains(&needle))
        .collect()
}
