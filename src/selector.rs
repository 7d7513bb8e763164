//! Per-slot recipe selection policy.
//!
//! Local first: the catalog pool for the slot, minus anything already served,
//! narrowed by diet (all requested tags) and budget (exact tier), then one
//! uniform random pick. When nothing local survives, one remote lookup with
//! the same parameters. The selector never records what it picks; the caller
//! does that once it accepts the result.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::catalog::RecipeCatalog;
use crate::memory::UsedRecipeMemory;
use crate::recipe::{BudgetTier, DietFilter, LocalRecipe, MealSlot, Recipe};
use crate::remote::{RemoteQuery, RemoteRecipeSource};

/// Whether `recipe` passes the novelty, diet and budget constraints.
pub fn is_eligible(
    recipe: &LocalRecipe,
    diet: &DietFilter,
    budget: Option<BudgetTier>,
    memory: &UsedRecipeMemory,
) -> bool {
    !memory.contains(recipe.id)
        && diet.is_satisfied_by(&recipe.diet)
        && budget.map_or(true, |b| recipe.budget == b)
}

/// Uniform random pick among the eligible local candidates for `slot`.
pub fn pick_local<'a, G: Rng + ?Sized>(
    catalog: &'a RecipeCatalog,
    slot: MealSlot,
    diet: &DietFilter,
    budget: Option<BudgetTier>,
    memory: &UsedRecipeMemory,
    rng: &mut G,
) -> Option<&'a LocalRecipe> {
    let options: Vec<&LocalRecipe> = catalog
        .candidates(slot)
        .iter()
        .filter(|r| is_eligible(r, diet, budget, memory))
        .collect();
    options.choose(rng).copied()
}

pub struct RecipeSelector<R, G> {
    catalog: Arc<RecipeCatalog>,
    remote: R,
    rng: G,
}

impl<R: RemoteRecipeSource, G: Rng> RecipeSelector<R, G> {
    pub fn new(catalog: Arc<RecipeCatalog>, remote: R, rng: G) -> Self {
        Self { catalog, remote, rng }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Choose a recipe for `slot`, or `None` when neither the catalog nor the
    /// remote source can satisfy the filters.
    pub async fn select(
        &mut self,
        slot: MealSlot,
        diet: &DietFilter,
        budget: Option<BudgetTier>,
        memory: &UsedRecipeMemory,
    ) -> Option<Recipe> {
        if let Some(local) = pick_local(&self.catalog, slot, diet, budget, memory, &mut self.rng) {
            debug!(%slot, recipe_id = %local.id, "Picked local recipe");
            return Some(Recipe::Local(local.clone()));
        }

        debug!(%slot, "Local catalog exhausted, asking remote source");
        let query = RemoteQuery::new(slot, diet, budget);
        self.remote.fetch_recipe(&query).await.map(Recipe::Remote)
    }
}
