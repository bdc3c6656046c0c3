use super::RecipeGenerator;
use crate::providers::{build_recipe_prompt, LlmProvider, ProviderError, RECIPE_PROMPT};
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

/// Asks an LLM provider for recipe suggestions
pub struct LlmRecipeGenerator {
    provider: Arc<dyn LlmProvider>,
}

impl LlmRecipeGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RecipeGenerator for LlmRecipeGenerator {
    async fn generate_recipes(&self, ingredients: &[String]) -> Result<String, ProviderError> {
        debug!(
            "Requesting recipes from {} for {} ingredients",
            self.provider.provider_name(),
            ingredients.len()
        );
        self.provider
            .complete(RECIPE_PROMPT, &build_recipe_prompt(ingredients))
            .await
    }
}
