//! External tests for the selection policy: diet and budget filtering,
//! remote fallback, and the single-breakfast scenario.

use std::sync::{Arc, Mutex};

use meal_shuffle::memory::UsedRecipeMemory;
use meal_shuffle::recipe::*;
use meal_shuffle::remote::{RemoteQuery, RemoteRecipeSource};
use meal_shuffle::selector::{pick_local, RecipeSelector};
use meal_shuffle::store::MemoryStore;
use meal_shuffle::RecipeCatalog;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rstest::rstest;

const NOW: u64 = 1_760_000_000_000;

// -- Helpers ---------------------------------------------------------------

/// Remote source that records every query it receives.
#[derive(Clone, Default)]
struct RecordingRemote {
    queries: Arc<Mutex<Vec<RemoteQuery>>>,
    reply: Option<RemoteRecipe>,
}

impl RecordingRemote {
    fn replying(reply: RemoteRecipe) -> Self {
        Self { reply: Some(reply), ..Self::default() }
    }

    fn queries(&self) -> Vec<RemoteQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl RemoteRecipeSource for RecordingRemote {
    async fn fetch_recipe(&self, query: &RemoteQuery) -> Option<RemoteRecipe> {
        self.queries.lock().unwrap().push(query.clone());
        self.reply.clone()
    }
}

fn local(id: u64, diet: &[DietTag], budget: BudgetTier) -> LocalRecipe {
    LocalRecipe {
        id: RecipeId(id),
        name: format!("Recipe {id}"),
        diet: diet.iter().copied().collect(),
        budget,
        instructions: "Cook it.".into(),
        image: format!("img-{id}.png"),
    }
}

fn remote_recipe(id: u64) -> RemoteRecipe {
    RemoteRecipe {
        id: RecipeId(id),
        name: "Spoonacular Special".into(),
        instructions: "<p>Mix.</p>".into(),
        ingredients: vec!["1 egg".into()],
        price_per_serving: Some(199),
        ready_in_minutes: Some(15),
        source_url: Some("https://example.com/r".into()),
        image: None,
    }
}

fn empty_memory() -> UsedRecipeMemory {
    UsedRecipeMemory::initialize_at(MemoryStore::new(), NOW)
}

fn diet(tags: &[DietTag]) -> DietFilter {
    tags.iter().copied().collect()
}

// -- Diet and budget filters (builtin catalog) ------------------------------

#[rstest]
#[case(MealSlot::Breakfast, &[DietTag::Vegetarian, DietTag::GlutenFree], Some(BudgetTier::Low), Some(1))]
#[case(MealSlot::Breakfast, &[DietTag::Vegetarian], Some(BudgetTier::Medium), Some(2))]
#[case(MealSlot::Breakfast, &[DietTag::GlutenFree], Some(BudgetTier::Medium), None)]
#[case(MealSlot::Lunch, &[DietTag::HighProtein], Some(BudgetTier::Medium), Some(3))]
#[case(MealSlot::Lunch, &[DietTag::HighProtein], Some(BudgetTier::Low), None)]
#[case(MealSlot::Lunch, &[], Some(BudgetTier::High), None)]
#[case(MealSlot::Dinner, &[DietTag::Vegetarian, DietTag::HighProtein], None, None)]
#[case(MealSlot::Dinner, &[], None, Some(4))]
#[case(MealSlot::Dessert, &[DietTag::GlutenFree], Some(BudgetTier::Low), Some(5))]
fn test_builtin_local_pick(
    #[case] slot: MealSlot,
    #[case] tags: &[DietTag],
    #[case] budget: Option<BudgetTier>,
    #[case] expected: Option<u64>,
) {
    let catalog = RecipeCatalog::builtin();
    let memory = empty_memory();
    let mut rng = StdRng::seed_from_u64(0);
    let pick = pick_local(&catalog, slot, &diet(tags), budget, &memory, &mut rng);
    assert_eq!(pick.map(|r| r.id), expected.map(RecipeId));
}

fn arb_tags() -> impl Strategy<Value = Vec<DietTag>> {
    proptest::sample::subsequence(DietTag::ALL.to_vec(), 0..=3)
}

fn arb_tier() -> impl Strategy<Value = BudgetTier> {
    prop_oneof![Just(BudgetTier::Low), Just(BudgetTier::Medium), Just(BudgetTier::High)]
}

fn arb_pool() -> impl Strategy<Value = Vec<LocalRecipe>> {
    proptest::collection::vec((arb_tags(), arb_tier()), 0..12).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (tags, tier))| local(i as u64 + 1, &tags, tier))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_local_pick_has_every_requested_tag(
        pool in arb_pool(),
        wanted in arb_tags(),
        seed in any::<u64>(),
    ) {
        let catalog = RecipeCatalog::new([(MealSlot::Dinner, pool)]).unwrap();
        let memory = empty_memory();
        let filter = diet(&wanted);
        let mut rng = StdRng::seed_from_u64(seed);
        if let Some(r) = pick_local(&catalog, MealSlot::Dinner, &filter, None, &memory, &mut rng) {
            for tag in &wanted {
                prop_assert!(r.diet.contains(tag));
            }
        }
    }

    #[test]
    fn prop_local_pick_matches_budget_exactly(
        pool in arb_pool(),
        tier in arb_tier(),
        seed in any::<u64>(),
    ) {
        let catalog = RecipeCatalog::new([(MealSlot::Lunch, pool.clone())]).unwrap();
        let memory = empty_memory();
        let mut rng = StdRng::seed_from_u64(seed);
        let pick = pick_local(&catalog, MealSlot::Lunch, &DietFilter::new(), Some(tier), &memory, &mut rng);
        match pick {
            Some(r) => {
                prop_assert_eq!(r.budget, tier);
            }
            None => {
                prop_assert!(pool.iter().all(|r| r.budget != tier));
            }
        }
    }

    #[test]
    fn prop_local_pick_never_returns_served_id(
        pool in arb_pool(),
        served in proptest::collection::vec(1u64..13, 0..6),
        seed in any::<u64>(),
    ) {
        let catalog = RecipeCatalog::new([(MealSlot::Breakfast, pool)]).unwrap();
        let mut memory = empty_memory();
        for id in &served {
            memory.record(RecipeId(*id));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        if let Some(r) = pick_local(&catalog, MealSlot::Breakfast, &DietFilter::new(), None, &memory, &mut rng) {
            prop_assert!(!served.contains(&r.id.0));
        }
    }
}

// -- Remote fallback ---------------------------------------------------------

#[tokio::test]
async fn test_lunch_fallback_calls_remote_exactly_once() {
    let remote = RecordingRemote::replying(remote_recipe(640_000));
    let mut selector = RecipeSelector::new(RecipeCatalog::builtin(), remote.clone(), StdRng::seed_from_u64(5));
    let memory = empty_memory();
    let filter = diet(&[DietTag::Vegetarian]);

    let recipe = selector
        .select(MealSlot::Lunch, &filter, Some(BudgetTier::Low), &memory)
        .await
        .expect("remote recipe");

    assert!(recipe.is_remote());
    let queries = remote.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].slot, MealSlot::Lunch);
    assert_eq!(queries[0].diet, filter);
    assert_eq!(queries[0].budget, Some(BudgetTier::Low));
    assert_eq!(queries[0].tags(), vec!["lunch", "vegetarian", "cheap"]);
}

#[tokio::test]
async fn test_remote_none_is_not_found() {
    let remote = RecordingRemote::default();
    let mut selector = RecipeSelector::new(RecipeCatalog::builtin(), remote.clone(), StdRng::seed_from_u64(5));
    let recipe = selector
        .select(MealSlot::Dessert, &diet(&[DietTag::HighProtein]), None, &empty_memory())
        .await;
    assert!(recipe.is_none());
    assert_eq!(remote.queries().len(), 1);
}

#[tokio::test]
async fn test_empty_pool_goes_straight_to_remote() {
    let remote = RecordingRemote::replying(remote_recipe(1));
    let mut selector = RecipeSelector::new(Arc::new(RecipeCatalog::default()), remote.clone(), StdRng::seed_from_u64(5));
    let recipe = selector.select(MealSlot::Dinner, &DietFilter::new(), None, &empty_memory()).await;
    // Remote id 1 may collide with a local id; that is allowed.
    assert_eq!(recipe.map(|r| r.id()), Some(RecipeId(1)));
    assert_eq!(remote.queries().len(), 1);
}

// -- Single-breakfast scenario -------------------------------------------------

#[tokio::test]
async fn test_single_breakfast_then_remote() {
    let catalog = RecipeCatalog::new([(
        MealSlot::Breakfast,
        vec![local(1, &[DietTag::Vegetarian, DietTag::GlutenFree], BudgetTier::Low)],
    )])
    .unwrap();
    let remote = RecordingRemote::default();
    let mut selector = RecipeSelector::new(Arc::new(catalog), remote.clone(), StdRng::seed_from_u64(9));
    let mut memory = empty_memory();
    let filter = diet(&[DietTag::Vegetarian]);

    let first = selector
        .select(MealSlot::Breakfast, &filter, Some(BudgetTier::Low), &memory)
        .await
        .expect("local breakfast");
    assert_eq!(first.id(), RecipeId(1));
    assert!(!first.is_remote());
    assert!(remote.queries().is_empty());

    memory.record(first.id());

    let second = selector
        .select(MealSlot::Breakfast, &filter, Some(BudgetTier::Low), &memory)
        .await;
    assert!(second.is_none());
    let queries = remote.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].slot, MealSlot::Breakfast);
}

#[test]
fn test_select_driven_by_block_on() {
    let remote = RecordingRemote::default();
    let mut selector = RecipeSelector::new(RecipeCatalog::builtin(), remote, StdRng::seed_from_u64(2));
    let memory = empty_memory();
    let recipe = tokio_test::block_on(selector.select(MealSlot::Lunch, &DietFilter::new(), None, &memory));
    assert_eq!(recipe.map(|r| r.id()), Some(RecipeId(3)));
}
