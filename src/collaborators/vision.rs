use super::ReceiptScanner;
use crate::config::ReceiptConfig;
use crate::providers::{
    check_status, gemini_key_from_env, ProviderError, GEMINI_BASE_URL, RECEIPT_SCAN_PROMPT,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

/// Reads grocery receipts with Gemini's multimodal `generateContent` endpoint
pub struct GeminiReceiptScanner {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiReceiptScanner {
    /// Create a scanner from configuration, falling back to GEMINI_API_KEY / GOOGLE_API_KEY
    pub fn new(config: &ReceiptConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(gemini_key_from_env)
            .ok_or("GEMINI_API_KEY not found in config or environment")?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| GEMINI_BASE_URL.to_string());

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ReceiptScanner for GeminiReceiptScanner {
    async fn scan_receipt(&self, image: &[u8], mime_type: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request_body = json!({
            "contents": [{
                "parts": [
                    { "text": RECEIPT_SCAN_PROMPT },
                    {
                        "inlineData": {
                            "mimeType": mime_type,
                            "data": STANDARD.encode(image)
                        }
                    }
                ]
            }]
        });

        debug!("Sending {} byte receipt image to {}", image.len(), self.model);

        let response = self.client.post(&url).json(&request_body).send().await?;
        let response_body: Value = check_status("Gemini vision", response).await?.json().await?;
        debug!("Gemini vision response: {:?}", response_body);

        // An empty candidate list means nothing was recognised on the receipt
        let text = response_body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("[]")
            .to_string();

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn scanner(base_url: String) -> GeminiReceiptScanner {
        GeminiReceiptScanner::new(&ReceiptConfig {
            model: "gemini-1.5-pro".to_string(),
            api_key: Some("test-key".to_string()),
            base_url: Some(base_url),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_scan_sends_inline_image() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-pro:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJsonString(
                r#"{"contents": [{"parts": [{}, {"inlineData": {"mimeType": "image/png", "data": "cmVjZWlwdA=="}}]}]}"#
                    .to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates": [{"content": {"parts": [{"text": "[{\"ingredient\": \"eggs\", \"quantity\": \"12\"}]"}]}}]}"#,
            )
            .create_async()
            .await;

        let raw = scanner(server.url())
            .scan_receipt(b"receipt", "image/png")
            .await
            .unwrap();
        assert!(raw.contains("eggs"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_scan_without_candidates_is_empty_list() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let raw = scanner(server.url())
            .scan_receipt(b"receipt", "image/jpeg")
            .await
            .unwrap();
        assert_eq!(raw, "[]");
    }

    #[tokio::test]
    async fn test_scan_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(503)
            .with_body("overloaded")
            .create_async()
            .await;

        let err = scanner(server.url())
            .scan_receipt(b"receipt", "image/jpeg")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
