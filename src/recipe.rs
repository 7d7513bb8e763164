use std::collections::BTreeSet;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers and slots
// ---------------------------------------------------------------------------

/// Recipe identifier. Local ids are unique per slot pool; remote ids come
/// from the remote catalog and may collide with local ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub u64);

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecipeId {
    fn from(v: u64) -> Self {
        RecipeId(v)
    }
}

/// One of the four fixed meal categories, in serving order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Dessert,
}

impl MealSlot {
    /// Every slot, in the order a shuffle pass visits them.
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Dessert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Dessert => "dessert",
        }
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Diet tags and filter
// ---------------------------------------------------------------------------

/// Dietary attribute a recipe can carry. Declaration order is the canonical
/// order tags are forwarded to the remote source in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum DietTag {
    Vegetarian,
    GlutenFree,
    HighProtein,
}

impl DietTag {
    pub const ALL: [DietTag; 3] = [DietTag::Vegetarian, DietTag::GlutenFree, DietTag::HighProtein];

    pub fn as_str(&self) -> &'static str {
        match self {
            DietTag::Vegetarian => "vegetarian",
            DietTag::GlutenFree => "gluten-free",
            DietTag::HighProtein => "high-protein",
        }
    }
}

impl std::fmt::Display for DietTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of dietary requirements; a recipe matches only if it carries all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DietFilter(BTreeSet<DietTag>);

impl DietFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: DietTag) -> bool {
        self.0.insert(tag)
    }

    pub fn remove(&mut self, tag: DietTag) -> bool {
        self.0.remove(&tag)
    }

    /// Flip a tag on or off, the way a checkbox would. Returns the new state.
    pub fn toggle(&mut self, tag: DietTag) -> bool {
        if self.0.remove(&tag) {
            false
        } else {
            self.0.insert(tag);
            true
        }
    }

    pub fn contains(&self, tag: DietTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Tags in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = DietTag> + '_ {
        self.0.iter().copied()
    }

    /// Conjunctive match: every requested tag must be present in `tags`.
    /// An empty filter matches everything.
    pub fn is_satisfied_by(&self, tags: &BTreeSet<DietTag>) -> bool {
        self.0.iter().all(|t| tags.contains(t))
    }
}

impl FromIterator<DietTag> for DietFilter {
    fn from_iter<I: IntoIterator<Item = DietTag>>(iter: I) -> Self {
        DietFilter(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Budget tier
// ---------------------------------------------------------------------------

/// Affordability tier, ordered cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BudgetTier {
    #[serde(rename = "$", alias = "low")]
    Low,
    #[serde(rename = "$$", alias = "medium")]
    Medium,
    #[serde(rename = "$$$", alias = "high")]
    High,
}

impl BudgetTier {
    pub fn symbol(&self) -> &'static str {
        match self {
            BudgetTier::Low => "$",
            BudgetTier::Medium => "$$",
            BudgetTier::High => "$$$",
        }
    }
}

impl std::fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for BudgetTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "$" | "low" => Ok(BudgetTier::Low),
            "$$" | "medium" => Ok(BudgetTier::Medium),
            "$$$" | "high" => Ok(BudgetTier::High),
            _ => Err(format!("Unknown budget tier: {} (expected $, $$, $$$, low, medium or high)", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Recipe records
// ---------------------------------------------------------------------------

/// A recipe from the bundled (or user-supplied) catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRecipe {
    pub id: RecipeId,
    pub name: String,
    #[serde(default)]
    pub diet: BTreeSet<DietTag>,
    pub budget: BudgetTier,
    pub instructions: String,
    pub image: String,
}

/// A recipe returned by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecipe {
    pub id: RecipeId,
    pub name: String,
    /// May contain HTML meant for direct display.
    pub instructions: String,
    pub ingredients: Vec<String>,
    /// Hundredths of a currency unit.
    pub price_per_serving: Option<u32>,
    pub ready_in_minutes: Option<u32>,
    pub source_url: Option<String>,
    pub image: Option<String>,
}

/// Either recipe shape, behind a shared set of display accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum Recipe {
    Local(LocalRecipe),
    Remote(RemoteRecipe),
}

impl Recipe {
    pub fn id(&self) -> RecipeId {
        match self {
            Recipe::Local(r) => r.id,
            Recipe::Remote(r) => r.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Recipe::Local(r) => &r.name,
            Recipe::Remote(r) => &r.name,
        }
    }

    pub fn instructions(&self) -> &str {
        match self {
            Recipe::Local(r) => &r.instructions,
            Recipe::Remote(r) => &r.instructions,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            Recipe::Local(r) => Some(r.image.as_str()),
            Recipe::Remote(r) => r.image.as_deref(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Recipe::Remote(_))
    }

    pub fn ingredients(&self) -> &[String] {
        match self {
            Recipe::Local(_) => &[],
            Recipe::Remote(r) => &r.ingredients,
        }
    }

    pub fn price_per_serving(&self) -> Option<u32> {
        match self {
            Recipe::Local(_) => None,
            Recipe::Remote(r) => r.price_per_serving,
        }
    }

    pub fn ready_in_minutes(&self) -> Option<u32> {
        match self {
            Recipe::Local(_) => None,
            Recipe::Remote(r) => r.ready_in_minutes,
        }
    }

    pub fn source_url(&self) -> Option<&str> {
        match self {
            Recipe::Local(_) => None,
            Recipe::Remote(r) => r.source_url.as_deref(),
        }
    }
}

impl From<LocalRecipe> for Recipe {
    fn from(r: LocalRecipe) -> Self {
        Recipe::Local(r)
    }
}

impl From<RemoteRecipe> for Recipe {
    fn from(r: RemoteRecipe) -> Self {
        Recipe::Remote(r)
    }
}
