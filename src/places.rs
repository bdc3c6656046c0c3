use crate::config::PlacesConfig;
use crate::error::PantryError;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FOURSQUARE_BASE_URL: &str = "https://api.foursquare.com";

/// A store or venue near the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub address: Option<String>,
}

/// Searches for nearby places matching a free-text query
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: String,
    radius: u32,
    limit: u32,
}

impl PlacesClient {
    pub fn new(config: &PlacesConfig) -> Result<Self, PantryError> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("FOURSQUARE_API_KEY").ok())
            .ok_or_else(|| {
                PantryError::BuilderError(
                    "FOURSQUARE_API_KEY not found in config or environment".to_string(),
                )
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| FOURSQUARE_BASE_URL.to_string());

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            radius: config.radius,
            limit: config.limit,
        })
    }

    pub async fn search(&self, lat: f64, lng: f64, query: &str) -> Result<Vec<Place>, PantryError> {
        let query = query.trim();
        if query.is_empty() || !lat.is_finite() || !lng.is_finite() {
            return Err(PantryError::ValidationError(
                "Missing required parameters".to_string(),
            ));
        }

        let response = self
            .client
            .get(format!("{}/v3/places/search", self.base_url))
            .header("Authorization", &self.api_key)
            .query(&[
                ("ll", format!("{},{}", lat, lng)),
                ("query", query.to_string()),
                ("radius", self.radius.to_string()),
                ("limit", self.limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| PantryError::PlacesError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PantryError::PlacesError(format!(
                "Foursquare API error ({})",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PantryError::PlacesError(e.to_string()))?;
        debug!("Places response: {:?}", body);

        Ok(parse_places(&body))
    }
}

fn parse_places(body: &Value) -> Vec<Place> {
    body["results"]
        .as_array()
        .map(|results| {
            results
                .iter()
                .filter_map(|result| {
                    let name = result["name"].as_str()?;
                    Some(Place {
                        name: name.to_string(),
                        address: result["location"]["formatted_address"]
                            .as_str()
                            .map(str::to_string),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
