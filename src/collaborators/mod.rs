//! External services the planning pipeline calls but does not implement.

mod extraction;
mod generation;
mod vision;

pub use extraction::{parse_ingredient_list, LlmIngredientExtractor};
pub use generation::LlmRecipeGenerator;
pub use vision::GeminiReceiptScanner;

use crate::providers::ProviderError;
use async_trait::async_trait;

/// Produces raw recipe text for a list of ingredient names
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn generate_recipes(&self, ingredients: &[String]) -> Result<String, ProviderError>;
}

/// Lists the ingredient names a recipe text refers to
#[async_trait]
pub trait IngredientExtractor: Send + Sync {
    async fn extract_ingredients(&self, recipe_text: &str) -> Result<Vec<String>, ProviderError>;
}

/// Reads `{ingredient, quantity}` line items off a grocery receipt image
#[async_trait]
pub trait ReceiptScanner: Send + Sync {
    async fn scan_receipt(&self, image: &[u8], mime_type: &str) -> Result<String, ProviderError>;
}
