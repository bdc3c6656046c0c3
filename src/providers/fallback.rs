use crate::config::AppConfig;
use crate::providers::{LlmProvider, ProviderError, ProviderFactory};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::sleep;

/// Tries each configured provider in order, retrying each one before moving on.
///
/// Only wraps completion calls, which are read-like and safe to repeat.
pub struct FallbackProvider {
    providers: Vec<Box<dyn LlmProvider>>,
    retry_attempts: u32,
    retry_delay_ms: u64,
}

impl FallbackProvider {
    /// Create a new fallback provider from configuration
    pub fn new(config: &AppConfig) -> Result<Self, ProviderError> {
        if !config.fallback.enabled {
            // If fallback is disabled, just use the default provider
            let default_provider = ProviderFactory::default_provider(config)?;
            return Ok(FallbackProvider {
                providers: vec![default_provider],
                retry_attempts: 1,
                retry_delay_ms: 0,
            });
        }

        let mut providers = Vec::new();

        for provider_name in &config.fallback.order {
            match config.providers.get(provider_name) {
                Some(provider_config) if provider_config.enabled => {
                    match ProviderFactory::create(provider_name, provider_config) {
                        Ok(provider) => {
                            info!("Added '{}' to fallback chain", provider_name);
                            providers.push(provider);
                        }
                        Err(e) => {
                            warn!("Failed to initialize provider '{}': {}", provider_name, e);
                        }
                    }
                }
                Some(_) => debug!("Skipping disabled provider '{}'", provider_name),
                None => warn!(
                    "Provider '{}' in fallback order not found in configuration",
                    provider_name
                ),
            }
        }

        Self::from_providers(
            providers,
            config.fallback.retry_attempts,
            config.fallback.retry_delay_ms,
        )
    }

    /// Build a chain from already constructed providers
    pub fn from_providers(
        providers: Vec<Box<dyn LlmProvider>>,
        retry_attempts: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, ProviderError> {
        if providers.is_empty() {
            return Err("No providers available in fallback configuration".into());
        }

        Ok(FallbackProvider {
            providers,
            retry_attempts: retry_attempts.max(1),
            retry_delay_ms,
        })
    }

    /// Try a provider, backing off linearly between attempts
    async fn try_provider_with_retry(
        &self,
        provider: &dyn LlmProvider,
        system: &str,
        user: &str,
    ) -> Result<String, String> {
        let mut last_error = String::new();

        for attempt in 1..=self.retry_attempts {
            debug!(
                "Calling {} (attempt {}/{})",
                provider.provider_name(),
                attempt,
                self.retry_attempts
            );

            match provider.complete(system, user).await {
                Ok(result) => {
                    info!("Completion succeeded using {}", provider.provider_name());
                    return Ok(result);
                }
                Err(e) => {
                    warn!(
                        "Provider {} failed (attempt {}/{}): {}",
                        provider.provider_name(),
                        attempt,
                        self.retry_attempts,
                        e
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < self.retry_attempts {
                let delay = Duration::from_millis(self.retry_delay_ms * attempt as u64);
                debug!("Waiting {:?} before retry", delay);
                sleep(delay).await;
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl LlmProvider for FallbackProvider {
    fn provider_name(&self) -> &str {
        if self.providers.len() == 1 {
            self.providers[0].provider_name()
        } else {
            "fallback"
        }
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let mut all_errors: Vec<String> = Vec::new();

        for provider in &self.providers {
            match self
                .try_provider_with_retry(provider.as_ref(), system, user)
                .await
            {
                Ok(result) => return Ok(result),
                Err(e) => {
                    all_errors.push(format!("{}: {}", provider.provider_name(), e));
                }
            }
        }

        Err(format!("All providers failed:\n{}", all_errors.join("\n")).into())
    }
}
