use crate::collaborators::{
    IngredientExtractor, LlmIngredientExtractor, LlmRecipeGenerator, RecipeGenerator,
};
use crate::config::AppConfig;
use crate::error::PantryError;
use crate::model::{PantryEntry, Recipe, ShoppingPlan};
use crate::normalizer::normalize_with_strategy;
use crate::providers::{LlmProvider, ProviderFactory};
use crate::reconciler::reconcile;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Runs the pantry -> recipes -> shopping list pipeline.
///
/// Steps are strictly sequential: generation, normalization, then
/// reconciliation. Only the per-recipe extraction calls fan out.
pub struct ShoppingPlanner {
    generator: Arc<dyn RecipeGenerator>,
    extractor: Arc<dyn IngredientExtractor>,
    call_timeout: Option<Duration>,
}

impl ShoppingPlanner {
    pub fn new(generator: Arc<dyn RecipeGenerator>, extractor: Arc<dyn IngredientExtractor>) -> Self {
        Self {
            generator,
            extractor,
            call_timeout: None,
        }
    }

    /// Bound every external call; a timeout counts as that call failing
    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = Some(call_timeout);
        self
    }

    /// Build a planner whose generator and extractor share one LLM provider
    pub fn with_provider(provider: Arc<dyn LlmProvider>) -> Self {
        Self::new(
            Arc::new(LlmRecipeGenerator::new(provider.clone())),
            Arc::new(LlmIngredientExtractor::new(provider)),
        )
    }

    /// Build a planner from configuration, honouring the fallback chain
    pub fn from_config(config: &AppConfig) -> Result<Self, PantryError> {
        let provider = ProviderFactory::text_provider(config)
            .map_err(|e| PantryError::BuilderError(e.to_string()))?;
        Ok(Self::with_provider(provider).with_timeout(config.call_timeout()))
    }

    /// Suggest recipes for ingredients typed in by the user.
    ///
    /// Blank entries are dropped; an empty list is rejected before any call is made.
    pub async fn suggest_recipes(&self, ingredients: &[String]) -> Result<Vec<Recipe>, PantryError> {
        let names: Vec<String> = ingredients
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        if names.is_empty() {
            return Err(PantryError::ValidationError(
                "Please enter at least one ingredient".to_string(),
            ));
        }

        self.generate(&names).await
    }

    /// Generate recipes from the pantry and the shopping list they imply.
    ///
    /// An empty pantry returns an empty plan without calling the generator.
    pub async fn generate_shopping_plan(
        &self,
        pantry: &[PantryEntry],
    ) -> Result<ShoppingPlan, PantryError> {
        let names: Vec<String> = pantry
            .iter()
            .map(|entry| entry.ingredient_name.clone())
            .collect();
        self.plan_for_ingredients(&names).await
    }

    /// Same as [`generate_shopping_plan`](Self::generate_shopping_plan) for bare ingredient names
    pub async fn plan_for_ingredients(&self, names: &[String]) -> Result<ShoppingPlan, PantryError> {
        if names.is_empty() {
            debug!("Pantry is empty, skipping recipe generation");
            return Ok(ShoppingPlan::default());
        }

        let recipes = self.generate(names).await?;
        let shopping_list =
            reconcile(&recipes, names, self.extractor.as_ref(), self.call_timeout).await;

        info!(
            "Planned {} recipes with {} missing ingredients",
            recipes.len(),
            shopping_list.len()
        );

        Ok(ShoppingPlan {
            recipes,
            shopping_list,
        })
    }

    async fn generate(&self, names: &[String]) -> Result<Vec<Recipe>, PantryError> {
        let call = self.generator.generate_recipes(names);
        let result = match self.call_timeout {
            Some(limit) => timeout(limit, call)
                .await
                .map_err(|_| PantryError::GenerationFailed(format!("timed out after {:?}", limit)))?,
            None => call.await,
        };
        let raw = result.map_err(|e| {
            error!("Recipe generation failed: {}", e);
            PantryError::GenerationFailed(e.to_string())
        })?;

        match normalize_with_strategy(&raw) {
            Ok((strategy, recipes)) => {
                debug!("Decoded {} recipes using {:?}", recipes.len(), strategy);
                Ok(recipes)
            }
            Err(e) => {
                error!("Could not decode recipe response: {}\n{}", e, raw);
                Err(e)
            }
        }
    }
}
