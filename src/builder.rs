use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, ProviderConfig};
use crate::providers::ProviderFactory;
use crate::{PantryError, ShoppingPlanner};

/// LLM provider selection for the builder
#[derive(Debug, Clone, Copy)]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    Google,
}

impl ProviderKind {
    /// Convert to provider name string used by the factory
    fn as_str(&self) -> &str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
        }
    }

    fn default_model(&self) -> &str {
        match self {
            ProviderKind::OpenAI => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-sonnet-4-5",
            ProviderKind::Google => "gemini-2.0-flash",
        }
    }
}

/// Builder for configuring a [`ShoppingPlanner`]
#[derive(Debug, Default)]
pub struct PlannerBuilder {
    provider: Option<ProviderKind>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl PlannerBuilder {
    /// Set the LLM provider used for generation and extraction
    ///
    /// Without a provider the planner is built from `pantry-chef.toml` and
    /// `PANTRY_CHEF__*` environment variables.
    ///
    /// # Example
    /// ```
    /// use pantry_chef::{PlannerBuilder, ProviderKind};
    ///
    /// let builder = PlannerBuilder::default().provider(ProviderKind::Google);
    /// ```
    pub fn provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the API key instead of relying on environment variables
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the LLM provider
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Point the provider at a custom or proxy endpoint
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Bound each external call
    ///
    /// # Example
    /// ```
    /// use pantry_chef::PlannerBuilder;
    /// use std::time::Duration;
    ///
    /// let builder = PlannerBuilder::default().timeout(Duration::from_secs(20));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Build the planner
    ///
    /// # Errors
    /// Returns `PantryError` if:
    /// - api_key or model is set without a provider
    /// - the provider cannot be created (e.g. missing API key)
    /// - configuration cannot be loaded
    ///
    /// # Example
    /// ```no_run
    /// # use pantry_chef::{PlannerBuilder, ProviderKind};
    /// # fn main() -> Result<(), pantry_chef::PantryError> {
    /// let planner = PlannerBuilder::default()
    ///     .provider(ProviderKind::OpenAI)
    ///     .api_key("sk-...")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<ShoppingPlanner, PantryError> {
        let Some(kind) = self.provider else {
            if self.api_key.is_some() || self.model.is_some() || self.base_url.is_some() {
                return Err(PantryError::BuilderError(
                    "api_key, model and base_url require a provider".to_string(),
                ));
            }
            let config = AppConfig::load()?;
            let planner = ShoppingPlanner::from_config(&config)?;
            return Ok(match self.timeout {
                Some(timeout) => planner.with_timeout(timeout),
                None => planner,
            });
        };

        let provider_config = ProviderConfig {
            enabled: true,
            model: self
                .model
                .unwrap_or_else(|| kind.default_model().to_string()),
            temperature: 0.7,
            max_tokens: 2000,
            api_key: self.api_key,
            base_url: self.base_url,
        };

        let provider = ProviderFactory::create(kind.as_str(), &provider_config)
            .map_err(|e| PantryError::BuilderError(e.to_string()))?;
        let timeout = self
            .timeout
            .unwrap_or_else(|| AppConfig::default().call_timeout());

        Ok(ShoppingPlanner::with_provider(Arc::from(provider)).with_timeout(timeout))
    }
}
