pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod memory;
pub mod recipe;
pub mod remote;
pub mod render;
pub mod selector;
pub mod store;

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;
use tracing::info;

pub use catalog::RecipeCatalog;
pub use error::MealError;
pub use memory::UsedRecipeMemory;
pub use recipe::{BudgetTier, DietFilter, DietTag, LocalRecipe, MealSlot, Recipe, RecipeId, RemoteRecipe};
pub use remote::{RemoteQuery, RemoteRecipeSource};
pub use selector::RecipeSelector;

// ---------------------------------------------------------------------------
// MealPlan: result of one shuffle pass
// ---------------------------------------------------------------------------

/// Slot → recipe mapping. A slot with no entry had nothing to serve.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MealPlan {
    meals: BTreeMap<MealSlot, Recipe>,
}

impl MealPlan {
    pub fn get(&self, slot: MealSlot) -> Option<&Recipe> {
        self.meals.get(&slot)
    }

    /// Filled slots in serving order.
    pub fn iter(&self) -> impl Iterator<Item = (MealSlot, &Recipe)> {
        self.meals.iter().map(|(slot, recipe)| (*slot, recipe))
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    fn insert(&mut self, slot: MealSlot, recipe: Recipe) {
        self.meals.insert(slot, recipe);
    }
}

// ---------------------------------------------------------------------------
// MealPlanner: shuffle-all-slots session
// ---------------------------------------------------------------------------

/// A planner session: the current filters, the used-recipe memory and the
/// most recent plan.
pub struct MealPlanner<R, G> {
    selector: RecipeSelector<R, G>,
    memory: UsedRecipeMemory,
    diet: DietFilter,
    budget: Option<BudgetTier>,
    meals: MealPlan,
}

impl<R: RemoteRecipeSource, G: Rng> MealPlanner<R, G> {
    pub fn new(selector: RecipeSelector<R, G>, memory: UsedRecipeMemory) -> Self {
        Self {
            selector,
            memory,
            diet: DietFilter::new(),
            budget: Some(BudgetTier::Medium),
            meals: MealPlan::default(),
        }
    }

    pub fn diet(&self) -> &DietFilter {
        &self.diet
    }

    pub fn set_diet(&mut self, diet: DietFilter) {
        self.diet = diet;
    }

    /// Flip one diet tag. Returns whether it is now active.
    pub fn toggle_diet(&mut self, tag: DietTag) -> bool {
        self.diet.toggle(tag)
    }

    pub fn budget(&self) -> Option<BudgetTier> {
        self.budget
    }

    pub fn set_budget(&mut self, budget: Option<BudgetTier>) {
        self.budget = budget;
    }

    /// The plan produced by the latest `generate_meals` call.
    pub fn meals(&self) -> &MealPlan {
        &self.meals
    }

    pub fn memory(&self) -> &UsedRecipeMemory {
        &self.memory
    }

    /// Run one shuffle pass over every slot, in order.
    ///
    /// Each accepted recipe is recorded before the next slot is drawn, so a
    /// pass never serves the same local recipe twice while alternatives
    /// remain. Slots with nothing to serve are left out of the plan; the pass
    /// itself never fails. The new plan replaces the previous one.
    pub async fn generate_meals(&mut self) -> &MealPlan {
        let mut plan = MealPlan::default();

        for slot in MealSlot::ALL {
            match self.selector.select(slot, &self.diet, self.budget, &self.memory).await {
                Some(recipe) => {
                    info!(%slot, recipe_id = %recipe.id(), name = recipe.name(), remote = recipe.is_remote(), "Slot filled");
                    self.memory.record(recipe.id());
                    plan.insert(slot, recipe);
                }
                None => {
                    info!(%slot, "No recipe available, leaving slot empty");
                }
            }
        }

        self.meals = plan;
        &self.meals
    }
}
