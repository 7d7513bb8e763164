//! Static pool of local recipes, partitioned by meal slot.
//!
//! The catalog is immutable once built and shared behind an `Arc`. The bundled
//! pool is constructed lazily on first use; a user-supplied TOML file can
//! replace it at startup.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::CatalogError;
use crate::recipe::{BudgetTier, DietTag, LocalRecipe, MealSlot, RecipeId};

static BUILTIN: Lazy<Arc<RecipeCatalog>> = Lazy::new(|| Arc::new(builtin_catalog()));

/// Local recipe pools keyed by slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeCatalog {
    pools: BTreeMap<MealSlot, Vec<LocalRecipe>>,
}

/// On-disk catalog layout: one array of tables per slot.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CatalogFile {
    breakfast: Vec<LocalRecipe>,
    lunch: Vec<LocalRecipe>,
    dinner: Vec<LocalRecipe>,
    dessert: Vec<LocalRecipe>,
}

impl RecipeCatalog {
    /// Build a catalog from explicit pools, rejecting duplicate ids within a slot.
    pub fn new(
        pools: impl IntoIterator<Item = (MealSlot, Vec<LocalRecipe>)>,
    ) -> Result<Self, CatalogError> {
        let mut map: BTreeMap<MealSlot, Vec<LocalRecipe>> = BTreeMap::new();
        for (slot, recipes) in pools {
            map.entry(slot).or_default().extend(recipes);
        }
        for (slot, recipes) in &map {
            let mut seen = HashSet::new();
            for r in recipes {
                if !seen.insert(r.id) {
                    return Err(CatalogError::DuplicateId { slot: slot.to_string(), id: r.id.0 });
                }
            }
        }
        Ok(Self { pools: map })
    }

    /// The bundled recipe pool, built once per process.
    pub fn builtin() -> Arc<RecipeCatalog> {
        Arc::clone(&BUILTIN)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(s)?;
        Self::new([
            (MealSlot::Breakfast, file.breakfast),
            (MealSlot::Lunch, file.lunch),
            (MealSlot::Dinner, file.dinner),
            (MealSlot::Dessert, file.dessert),
        ])
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// The unfiltered pool for `slot`. Empty when the slot has no recipes.
    pub fn candidates(&self, slot: MealSlot) -> &[LocalRecipe] {
        self.pools.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of recipes across all slots.
    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn recipe(
    id: u64,
    name: &str,
    diet: &[DietTag],
    budget: BudgetTier,
    instructions: &str,
    image: &str,
) -> LocalRecipe {
    LocalRecipe {
        id: RecipeId(id),
        name: name.to_string(),
        diet: diet.iter().copied().collect(),
        budget,
        instructions: instructions.to_string(),
        image: image.to_string(),
    }
}

fn builtin_catalog() -> RecipeCatalog {
    use BudgetTier::*;
    use DietTag::*;

    let mut pools = BTreeMap::new();
    pools.insert(
        MealSlot::Breakfast,
        vec![
            recipe(
                1,
                "Oatmeal with Fruit",
                &[Vegetarian, GlutenFree],
                Low,
                "Cook oats, top with fruit.",
                "https://via.placeholder.com/300x200?text=Oatmeal",
            ),
            recipe(
                2,
                "Avocado Toast",
                &[Vegetarian],
                Medium,
                "Toast bread, mash avocado, season.",
                "https://via.placeholder.com/300x200?text=Avocado+Toast",
            ),
        ],
    );
    pools.insert(
        MealSlot::Lunch,
        vec![recipe(
            3,
            "Chicken Salad",
            &[HighProtein],
            Medium,
            "Mix grilled chicken with greens.",
            "https://via.placeholder.com/300x200?text=Chicken+Salad",
        )],
    );
    pools.insert(
        MealSlot::Dinner,
        vec![recipe(
            4,
            "Veggie Stir Fry",
            &[Vegetarian, GlutenFree],
            Low,
            "Stir fry vegetables, add sauce.",
            "https://via.placeholder.com/300x200?text=Veggie+Stir+Fry",
        )],
    );
    pools.insert(
        MealSlot::Dessert,
        vec![recipe(
            5,
            "Fruit Salad",
            &[Vegetarian, GlutenFree],
            Low,
            "Chop seasonal fruits, mix.",
            "https://via.placeholder.com/300x200?text=Fruit+Salad",
        )],
    );
    RecipeCatalog { pools }
}
