use super::IngredientExtractor;
use crate::model::normalize_ingredient_name;
use crate::providers::{LlmProvider, ProviderError, INGREDIENT_EXTRACTION_PROMPT};
use async_trait::async_trait;
use std::sync::Arc;

/// Asks an LLM provider for the ingredients a recipe uses
pub struct LlmIngredientExtractor {
    provider: Arc<dyn LlmProvider>,
}

impl LlmIngredientExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl IngredientExtractor for LlmIngredientExtractor {
    async fn extract_ingredients(&self, recipe_text: &str) -> Result<Vec<String>, ProviderError> {
        let reply = self
            .provider
            .complete(INGREDIENT_EXTRACTION_PROMPT, recipe_text)
            .await?;
        Ok(parse_ingredient_list(&reply))
    }
}

/// Split a comma-separated reply into normalized ingredient names
pub fn parse_ingredient_list(reply: &str) -> Vec<String> {
    reply
        .split(',')
        .map(normalize_ingredient_name)
        .filter(|name| !name.is_empty())
        .collect()
}
