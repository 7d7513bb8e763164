use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use crate::config::PlannerConfig;
use crate::recipe::{BudgetTier, DietFilter, DietTag};

#[derive(Parser, Debug)]
#[command(name = "meal-shuffle")]
#[command(version)]
#[command(about = "Shuffle a day of meals from a local recipe list, falling back to Spoonacular")]
pub struct Args {
    /// Dietary requirement every meal must meet (repeatable)
    #[arg(long, value_enum)]
    pub diet: Vec<DietTag>,

    /// Budget tier: $, $$, $$$ (or low, medium, high)
    #[arg(long, short, value_parser = parse_budget, conflicts_with = "any_budget")]
    pub budget: Option<BudgetTier>,

    /// Do not filter by budget at all
    #[arg(long)]
    pub any_budget: bool,

    /// TOML configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// SQLite file holding the used-recipe memory
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Keep the used-recipe memory in-process only
    #[arg(long, conflicts_with = "store")]
    pub ephemeral: bool,

    /// TOML recipe catalog replacing the bundled recipes
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Never contact the remote recipe API
    #[arg(long)]
    pub offline: bool,

    /// Seed for a reproducible shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the plan as JSON instead of cards
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print shell completions and exit
    #[arg(long, value_enum)]
    pub completions: Option<Shell>,
}

fn parse_budget(s: &str) -> Result<BudgetTier, String> {
    s.parse()
}

impl Args {
    /// Effective budget: `--any-budget` clears it, `--budget` wins over config.
    pub fn resolve_budget(&self, config: &PlannerConfig) -> Option<BudgetTier> {
        if self.any_budget {
            None
        } else {
            self.budget.or(config.default_budget)
        }
    }

    /// Effective diet: CLI tags when any were given, otherwise the config default.
    pub fn resolve_diet(&self, config: &PlannerConfig) -> DietFilter {
        if self.diet.is_empty() {
            config.default_diet.iter().copied().collect()
        } else {
            self.diet.iter().copied().collect()
        }
    }

    /// Fold path and remote flags into `config`.
    pub fn apply_to(&self, mut config: PlannerConfig) -> PlannerConfig {
        if let Some(store) = &self.store {
            config.store_path = store.clone();
        }
        if let Some(catalog) = &self.catalog {
            config.catalog_path = Some(catalog.clone());
        }
        if self.offline {
            config.remote.enabled = false;
        }
        config
    }

    /// Default log filter for the verbosity count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
