//! Remote recipe source boundary and the Spoonacular HTTP client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RemoteError;
use crate::recipe::{BudgetTier, DietFilter, MealSlot, RecipeId, RemoteRecipe};

/// Placeholder used when the API returns no instructions.
pub const NO_INSTRUCTIONS: &str = "No instructions provided.";

/// Tag sent for the lowest budget tier; other tiers send nothing.
pub const CHEAP_TAG: &str = "cheap";

/// Parameters for one remote lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteQuery {
    pub slot: MealSlot,
    pub diet: DietFilter,
    pub budget: Option<BudgetTier>,
}

impl RemoteQuery {
    pub fn new(slot: MealSlot, diet: &DietFilter, budget: Option<BudgetTier>) -> Self {
        Self { slot, diet: diet.clone(), budget }
    }

    /// Tag list: slot, diet tags in canonical order, then `cheap` for the
    /// lowest budget tier only.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags = vec![self.slot.as_str()];
        tags.extend(self.diet.iter().map(|t| t.as_str()));
        if self.budget == Some(BudgetTier::Low) {
            tags.push(CHEAP_TAG);
        }
        tags
    }
}

/// Something that can supply one randomly chosen recipe for a query.
///
/// Implementations swallow every failure (transport, status, decoding, empty
/// result) and report it as `None`.
#[allow(async_fn_in_trait)]
pub trait RemoteRecipeSource {
    async fn fetch_recipe(&self, query: &RemoteQuery) -> Option<RemoteRecipe>;
}

/// `None` is a source that never has anything, used when running offline.
impl<S: RemoteRecipeSource> RemoteRecipeSource for Option<S> {
    async fn fetch_recipe(&self, query: &RemoteQuery) -> Option<RemoteRecipe> {
        match self {
            Some(source) => source.fetch_recipe(query).await,
            None => {
                debug!(slot = %query.slot, "Remote source disabled");
                None
            }
        }
    }
}

// -- Spoonacular wire types --------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RandomRecipesResponse {
    #[serde(default)]
    pub recipes: Vec<SpoonacularRecipe>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpoonacularRecipe {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub instructions: Option<String>,
    pub extended_ingredients: Vec<SpoonacularIngredient>,
    #[serde(default)]
    pub price_per_serving: Option<f64>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SpoonacularIngredient {
    pub original: String,
}

impl From<SpoonacularRecipe> for RemoteRecipe {
    fn from(r: SpoonacularRecipe) -> Self {
        let instructions = r
            .instructions
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| NO_INSTRUCTIONS.to_string());
        RemoteRecipe {
            id: RecipeId(r.id),
            name: r.title,
            instructions,
            ingredients: r.extended_ingredients.into_iter().map(|i| i.original).collect(),
            price_per_serving: r
                .price_per_serving
                .filter(|p| p.is_finite() && *p >= 0.0)
                .map(|p| p.round() as u32),
            ready_in_minutes: r.ready_in_minutes,
            source_url: r.source_url,
            image: r.image,
        }
    }
}

/// Request parameters, serialized into the query string.
#[derive(Debug, Serialize)]
struct RandomRecipesParams<'a> {
    number: u32,
    tags: String,
    #[serde(rename = "apiKey")]
    api_key: &'a str,
}

// ---------------------------------------------------------------------------
// SpoonacularClient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SpoonacularConfig {
    /// Base URL of the API (e.g. `https://api.spoonacular.com`).
    pub base_url: String,
    pub api_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl SpoonacularConfig {
    /// Defaults: connect timeout 3 s, request timeout 10 s.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for Spoonacular's `/recipes/random` endpoint.
pub struct SpoonacularClient {
    config: SpoonacularConfig,
    client: reqwest::Client,
}

impl SpoonacularClient {
    pub fn new(config: SpoonacularConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, client })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/recipes/random", self.config.base_url.trim_end_matches('/'))
    }

    /// Fetch one random recipe matching `query`.
    ///
    /// # Returns
    /// - `Ok(Some(_))` on a 2xx response carrying at least one recipe
    /// - `Ok(None)` on a 2xx response with an empty `recipes` list
    /// - `Err(RemoteError::Connect)` on transport failure or timeout
    /// - `Err(RemoteError::Http)` on a non-2xx status
    /// - `Err(RemoteError::Json)` when the body does not decode
    pub async fn fetch_random(&self, query: &RemoteQuery) -> Result<Option<RemoteRecipe>, RemoteError> {
        let url = self.endpoint();
        let params = RandomRecipesParams {
            number: 1,
            tags: query.tags().join(","),
            api_key: &self.config.api_key,
        };

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| RemoteError::Connect { url: url.clone(), detail: e.to_string() })?;

        if !resp.status().is_success() {
            return Err(RemoteError::Http { status: resp.status().as_u16(), url });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| RemoteError::Connect { url: url.clone(), detail: e.to_string() })?;

        parse_random_response(&bytes)
    }
}

/// Decode a `/recipes/random` body into at most one recipe.
pub fn parse_random_response(body: &[u8]) -> Result<Option<RemoteRecipe>, RemoteError> {
    let parsed: RandomRecipesResponse =
        serde_json::from_slice(body).map_err(|e| RemoteError::Json(e.to_string()))?;
    Ok(parsed.recipes.into_iter().next().map(RemoteRecipe::from))
}

impl RemoteRecipeSource for SpoonacularClient {
    async fn fetch_recipe(&self, query: &RemoteQuery) -> Option<RemoteRecipe> {
        match self.fetch_random(query).await {
            Ok(Some(recipe)) => {
                debug!(slot = %query.slot, recipe_id = %recipe.id, "Remote recipe fetched");
                Some(recipe)
            }
            Ok(None) => {
                debug!(slot = %query.slot, "Remote source returned no recipes");
                None
            }
            Err(e) => {
                warn!(slot = %query.slot, error = %e, "Remote recipe fetch failed");
                None
            }
        }
    }
}
