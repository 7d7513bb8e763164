use std::io;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use meal_shuffle::cli::Args;
use meal_shuffle::config::PlannerConfig;
use meal_shuffle::remote::SpoonacularClient;
use meal_shuffle::render::render_plan;
use meal_shuffle::store::{KeyValueStore, MemoryStore, SqliteStore};
use meal_shuffle::{MealError, MealPlanner, RecipeCatalog, RecipeSelector, UsedRecipeMemory};

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_store(args: &Args, config: &PlannerConfig) -> Result<Box<dyn KeyValueStore>, MealError> {
    if args.ephemeral {
        return Ok(Box::new(MemoryStore::new()));
    }
    debug!(path = %config.store_path.display(), "Opening used-recipe store");
    Ok(Box::new(SqliteStore::open(&config.store_path)?))
}

fn load_catalog(config: &PlannerConfig) -> Result<Arc<RecipeCatalog>, MealError> {
    match &config.catalog_path {
        Some(path) => {
            let catalog = RecipeCatalog::load(path)?;
            info!(path = %path.display(), recipes = catalog.len(), "Loaded recipe catalog");
            Ok(Arc::new(catalog))
        }
        None => Ok(RecipeCatalog::builtin()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "meal-shuffle", &mut io::stdout());
        return Ok(());
    }

    init_tracing(args.log_level());

    let config = PlannerConfig::load_or_default(args.config.as_deref())?.with_env_overrides();
    let config = args.apply_to(config);

    let catalog = load_catalog(&config)?;
    let memory = UsedRecipeMemory::initialize(open_store(&args, &config)?);

    let remote = match config.remote.spoonacular() {
        Some(cfg) => Some(SpoonacularClient::new(cfg).map_err(MealError::from)?),
        None => {
            info!("Remote recipe source disabled (offline or no API key)");
            None
        }
    };

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut planner = MealPlanner::new(RecipeSelector::new(catalog, remote, rng), memory);
    planner.set_diet(args.resolve_diet(&config));
    planner.set_budget(args.resolve_budget(&config));

    let plan = planner.generate_meals().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(plan)?);
    } else {
        println!("{}", render_plan(plan));
    }

    Ok(())
}
