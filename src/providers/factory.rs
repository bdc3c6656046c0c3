use crate::collaborators::{GeminiReceiptScanner, ReceiptScanner};
use crate::config::{AppConfig, ProviderConfig, ReceiptConfig};
use crate::providers::{
    AnthropicProvider, FallbackProvider, GoogleProvider, LlmProvider, OpenAIProvider,
    ProviderError,
};
use log::debug;
use std::sync::Arc;

/// Builds the text and vision collaborators named in an [`AppConfig`]
pub struct ProviderFactory;

impl ProviderFactory {
    /// One chat provider by name: "openai", "anthropic" or "google"
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
    ) -> Result<Box<dyn LlmProvider>, ProviderError> {
        if !config.enabled {
            return Err(format!("Provider '{}' is disabled", provider_name).into());
        }

        let provider: Box<dyn LlmProvider> = match provider_name {
            "openai" => Box::new(OpenAIProvider::new(config)?),
            "anthropic" => Box::new(AnthropicProvider::new(config)?),
            "google" => Box::new(GoogleProvider::new(config)?),
            _ => return Err(format!("Unknown provider: {}", provider_name).into()),
        };
        debug!("Created '{}' provider with model {}", provider_name, config.model);
        Ok(provider)
    }

    /// The provider named by `default_provider`
    pub fn default_provider(config: &AppConfig) -> Result<Box<dyn LlmProvider>, ProviderError> {
        let name = &config.default_provider;
        let provider_config = config
            .providers
            .get(name)
            .ok_or_else(|| format!("Default provider '{}' is not configured", name))?;

        Self::create(name, provider_config)
    }

    /// Provider used for recipe generation and ingredient extraction.
    ///
    /// Both share the fallback chain, so one retry policy covers every text call.
    pub fn text_provider(config: &AppConfig) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(FallbackProvider::new(config)?))
    }

    /// Gemini scanner for receipt photos.
    ///
    /// When the `receipt` section carries no key or base URL, those of a
    /// configured `google` provider are used before the environment.
    pub fn receipt_scanner(config: &AppConfig) -> Result<Arc<dyn ReceiptScanner>, ProviderError> {
        let google = config.providers.get("google");
        let receipt = ReceiptConfig {
            model: config.receipt.model.clone(),
            api_key: config
                .receipt
                .api_key
                .clone()
                .or_else(|| google.and_then(|g| g.api_key.clone())),
            base_url: config
                .receipt
                .base_url
                .clone()
                .or_else(|| google.and_then(|g| g.base_url.clone())),
        };

        Ok(Arc::new(GeminiReceiptScanner::new(&receipt)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::collections::HashMap;

    fn provider_config(api_key: Option<&str>, base_url: Option<String>) -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            model: "test-model".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            api_key: api_key.map(str::to_string),
            base_url,
        }
    }

    #[test]
    fn test_create_each_provider() {
        let config = provider_config(Some("k"), None);
        for name in ["openai", "anthropic", "google"] {
            let provider = ProviderFactory::create(name, &config).unwrap();
            assert_eq!(provider.provider_name(), name);
        }
    }

    #[test]
    fn test_create_rejects_unknown_and_disabled() {
        let mut config = provider_config(Some("k"), None);
        let err = ProviderFactory::create("mistral", &config).err().unwrap();
        assert!(err.to_string().contains("Unknown provider"));

        config.enabled = false;
        let err = ProviderFactory::create("openai", &config).err().unwrap();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_default_provider_must_be_configured() {
        let config = AppConfig {
            default_provider: "anthropic".to_string(),
            ..Default::default()
        };
        let err = ProviderFactory::default_provider(&config).err().unwrap();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn test_text_provider_without_fallback_uses_default() {
        let mut providers = HashMap::new();
        providers.insert("openai".to_string(), provider_config(Some("k"), None));
        let config = AppConfig {
            default_provider: "openai".to_string(),
            providers,
            ..Default::default()
        };

        let provider = ProviderFactory::text_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "openai");
    }

    #[tokio::test]
    async fn test_receipt_scanner_borrows_google_settings() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-pro:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "google-key".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates": [{"content": {"parts": [{"text": "[]"}]}}]}"#)
            .create_async()
            .await;

        let mut providers = HashMap::new();
        providers.insert(
            "google".to_string(),
            provider_config(Some("google-key"), Some(server.url())),
        );
        let config = AppConfig {
            providers,
            ..Default::default()
        };

        let scanner = ProviderFactory::receipt_scanner(&config).unwrap();
        let text = scanner.scan_receipt(b"jpeg", "image/jpeg").await.unwrap();
        assert_eq!(text, "[]");
        mock.assert_async().await;
    }
}
