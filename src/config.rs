//! TOML configuration for a planner session.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! Environment variables override the file; CLI flags override both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::recipe::{BudgetTier, DietTag};
use crate::remote::SpoonacularConfig;

pub const ENV_API_KEY: &str = "SPOONACULAR_API_KEY";
pub const ENV_STORE_PATH: &str = "MEAL_SHUFFLE_STORE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// SQLite file holding the used-recipe memory.
    pub store_path: PathBuf,
    /// Optional TOML catalog replacing the bundled recipes.
    pub catalog_path: Option<PathBuf>,
    pub default_budget: Option<BudgetTier>,
    pub default_diet: Vec<DietTag>,
    pub remote: RemoteConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("meal_shuffle.db"),
            catalog_path: None,
            default_budget: Some(BudgetTier::Medium),
            default_diet: Vec::new(),
            remote: RemoteConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.spoonacular.com".to_string(),
            api_key: None,
            connect_timeout_secs: 3,
            request_timeout_secs: 10,
        }
    }
}

impl RemoteConfig {
    /// Client settings, or `None` when the remote source is disabled or has no key.
    pub fn spoonacular(&self) -> Option<SpoonacularConfig> {
        if !self.enabled {
            return None;
        }
        let key = self.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        let mut cfg = SpoonacularConfig::new(self.base_url.clone(), key);
        cfg.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        cfg.request_timeout = Duration::from_secs(self.request_timeout_secs);
        Some(cfg)
    }
}

impl PlannerConfig {
    pub fn from_toml_str(s: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw, path)
    }

    /// Load `path` if given, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.is_empty()) {
            self.remote.api_key = Some(key);
        }
        if let Some(path) = lookup(ENV_STORE_PATH).filter(|p| !p.is_empty()) {
            self.store_path = PathBuf::from(path);
        }
        self
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|k| std::env::var(k).ok())
    }
}
