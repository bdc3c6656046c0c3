mod anthropic;
mod factory;
mod fallback;
mod google;
mod open_ai;
mod prompt;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use fallback::FallbackProvider;
pub use google::GoogleProvider;
pub(crate) use google::{gemini_key_from_env, GEMINI_BASE_URL};
pub use open_ai::OpenAIProvider;
pub use prompt::{
    build_recipe_prompt, INGREDIENT_EXTRACTION_PROMPT, RECEIPT_SCAN_PROMPT, RECIPE_PROMPT,
};

use async_trait::async_trait;
use std::error::Error;

pub type ProviderError = Box<dyn Error + Send + Sync>;

/// Unified trait for all LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Send one system prompt plus one user message and return the reply text
    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

/// Fail with the status and body when the upstream answered with a non-2xx code
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(format!("{} API error ({}): {}", provider, status, body).into())
}
