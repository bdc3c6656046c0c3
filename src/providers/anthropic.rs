use crate::config::ProviderConfig;
use crate::providers::{check_status, LlmProvider, ProviderError};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or("ANTHROPIC_API_KEY not found in config or environment")?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.anthropic.com".to_string());

        Ok(AnthropicProvider {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "system": system,
                "messages": [
                    {
                        "role": "user",
                        "content": user
                    }
                ]
            }))
            .send()
            .await?;

        let response_body: Value = check_status("Anthropic", response).await?.json().await?;
        debug!("{:?}", response_body);

        let text = response_body["content"][0]["text"]
            .as_str()
            .ok_or("Failed to extract content from Anthropic response")?
            .to_string();

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn test_config(base_url: Option<String>) -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            model: "claude-sonnet-4-5".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            api_key: Some("test-key".to_string()),
            base_url,
        }
    }

    #[tokio::test]
    async fn test_complete_reads_first_text_block() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", "2023-06-01")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"content": [{"type": "text", "text": "garlic, olive oil"}]}"#)
            .create_async()
            .await;

        let provider = AnthropicProvider::new(&test_config(Some(server.url()))).unwrap();
        let result = provider.complete("system", "user").await.unwrap();

        assert_eq!(result, "garlic, olive oil");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_provider_name() {
        let provider = AnthropicProvider::new(&test_config(None)).unwrap();
        assert_eq!(provider.provider_name(), "anthropic");
    }
}
