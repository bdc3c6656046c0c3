//! Per-user storage of on-hand ingredients.
//!
//! The store owns consistency. Callers re-list after a write if they need
//! fresh state; entries are never updated in place and a re-add creates a
//! second entry.

use crate::config::StoreConfig;
use crate::error::PantryError;
use crate::model::PantryEntry;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[async_trait]
pub trait PantryStore: Send + Sync {
    /// Entries for a user, newest first
    async fn list(&self, user_id: &str) -> Result<Vec<PantryEntry>, PantryError>;

    async fn add(
        &self,
        user_id: &str,
        ingredient_name: &str,
        quantity: Option<&str>,
    ) -> Result<PantryEntry, PantryError>;

    async fn delete(&self, user_id: &str, entry_id: &str) -> Result<(), PantryError>;

    /// Insert several entries, e.g. the result of a receipt import.
    ///
    /// Either every entry is stored or none is.
    async fn add_all(
        &self,
        user_id: &str,
        entries: &[PantryEntry],
    ) -> Result<Vec<PantryEntry>, PantryError>;
}

/// Trim the ingredient and quantity, rejecting a blank ingredient
fn validate_new_entry<'a>(
    ingredient_name: &'a str,
    quantity: Option<&'a str>,
) -> Result<(&'a str, Option<&'a str>), PantryError> {
    let ingredient_name = ingredient_name.trim();
    if ingredient_name.is_empty() {
        return Err(PantryError::ValidationError(
            "Ingredient name cannot be empty".to_string(),
        ));
    }
    let quantity = quantity.map(str::trim).filter(|q| !q.is_empty());
    Ok((ingredient_name, quantity))
}

/// Process-local store, used for offline runs and tests
#[derive(Default)]
pub struct InMemoryPantryStore {
    entries: RwLock<HashMap<String, Vec<PantryEntry>>>,
    next_id: AtomicU64,
}

impl InMemoryPantryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PantryStore for InMemoryPantryStore {
    async fn list(&self, user_id: &str) -> Result<Vec<PantryEntry>, PantryError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(user_id)
            .map(|items| items.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn add(
        &self,
        user_id: &str,
        ingredient_name: &str,
        quantity: Option<&str>,
    ) -> Result<PantryEntry, PantryError> {
        let (ingredient_name, quantity) = validate_new_entry(ingredient_name, quantity)?;
        let entry = PantryEntry {
            id: (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string(),
            ingredient_name: ingredient_name.to_string(),
            quantity: quantity.map(str::to_string),
        };

        self.entries
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn add_all(
        &self,
        user_id: &str,
        entries: &[PantryEntry],
    ) -> Result<Vec<PantryEntry>, PantryError> {
        let mut stored = Vec::with_capacity(entries.len());
        for entry in entries {
            let (ingredient_name, quantity) =
                validate_new_entry(&entry.ingredient_name, entry.quantity.as_deref())?;
            stored.push(PantryEntry {
                id: (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string(),
                ingredient_name: ingredient_name.to_string(),
                quantity: quantity.map(str::to_string),
            });
        }

        self.entries
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn delete(&self, user_id: &str, entry_id: &str) -> Result<(), PantryError> {
        if let Some(items) = self.entries.write().await.get_mut(user_id) {
            items.retain(|entry| entry.id != entry_id);
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct StoredRow {
    id: serde_json::Value,
    ingredient: String,
    quantity: Option<String>,
}

impl From<StoredRow> for PantryEntry {
    fn from(row: StoredRow) -> Self {
        let id = match row.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        PantryEntry {
            id,
            ingredient_name: row.ingredient,
            quantity: row.quantity,
        }
    }
}

/// Hosted table reached over a PostgREST-style HTTP API
pub struct RestPantryStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl RestPantryStore {
    pub fn new(config: &StoreConfig) -> Result<Self, PantryError> {
        let base_url = config.base_url.clone().ok_or_else(|| {
            PantryError::BuilderError("store.base_url is not configured".to_string())
        })?;
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("PANTRY_STORE_API_KEY").ok())
            .ok_or_else(|| {
                PantryError::BuilderError(
                    "PANTRY_STORE_API_KEY not found in config or environment".to_string(),
                )
            })?;

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table: config.table.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.base_url, self.table)
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url())
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PantryError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(PantryError::StoreError(format!("{}: {}", status, body)))
    }
}

#[async_trait]
impl PantryStore for RestPantryStore {
    async fn list(&self, user_id: &str) -> Result<Vec<PantryEntry>, PantryError> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[
                ("select", "id,ingredient,quantity".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<StoredRow> = Self::check(response).await?.json().await?;
        debug!("Loaded {} pantry entries for {}", rows.len(), user_id);
        Ok(rows.into_iter().map(PantryEntry::from).collect())
    }

    async fn add(
        &self,
        user_id: &str,
        ingredient_name: &str,
        quantity: Option<&str>,
    ) -> Result<PantryEntry, PantryError> {
        let (ingredient_name, quantity) = validate_new_entry(ingredient_name, quantity)?;

        let response = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=representation")
            .json(&json!({
                "user_id": user_id,
                "ingredient": ingredient_name,
                "quantity": quantity,
            }))
            .send()
            .await?;

        let mut rows: Vec<StoredRow> = Self::check(response).await?.json().await?;
        let row = rows
            .pop()
            .ok_or_else(|| PantryError::StoreError("insert returned no row".to_string()))?;
        info!("Added '{}' to pantry", ingredient_name);
        Ok(row.into())
    }

    async fn add_all(
        &self,
        user_id: &str,
        entries: &[PantryEntry],
    ) -> Result<Vec<PantryEntry>, PantryError> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            let (ingredient_name, quantity) =
                validate_new_entry(&entry.ingredient_name, entry.quantity.as_deref())?;
            rows.push(json!({
                "user_id": user_id,
                "ingredient": ingredient_name,
                "quantity": quantity,
            }));
        }

        // one array body is a single insert statement on the server
        let response = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;

        let stored: Vec<StoredRow> = Self::check(response).await?.json().await?;
        if stored.len() != entries.len() {
            return Err(PantryError::StoreError(format!(
                "bulk insert returned {} rows for {} entries",
                stored.len(),
                entries.len()
            )));
        }
        info!("Added {} entries to pantry", stored.len());
        Ok(stored.into_iter().map(PantryEntry::from).collect())
    }

    async fn delete(&self, user_id: &str, entry_id: &str) -> Result<(), PantryError> {
        let response = self
            .request(reqwest::Method::DELETE)
            .query(&[
                ("id", format!("eq.{}", entry_id)),
                ("user_id", format!("eq.{}", user_id)),
            ])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_in_memory_add_list_delete() {
        let store = InMemoryPantryStore::new();
        let eggs = store.add("u1", "  eggs ", Some("12")).await.unwrap();
        store.add("u1", "milk", Some("  ")).await.unwrap();
        store.add("u2", "rice", None).await.unwrap();

        let listed = store.list("u1").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].ingredient_name, "milk");
        assert_eq!(listed[0].quantity, None);
        assert_eq!(listed[1].ingredient_name, "eggs");

        store.delete("u1", &eggs.id).await.unwrap();
        let listed = store.list("u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(store.list("u2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_re_add_creates_second_entry() {
        let store = InMemoryPantryStore::new();
        let first = store.add("u1", "eggs", None).await.unwrap();
        let second = store.add("u1", "eggs", Some("6")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.list("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_ingredient_rejected() {
        let store = InMemoryPantryStore::new();
        let err = store.add("u1", "   ", None).await.unwrap_err();
        assert!(matches!(err, PantryError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_add_all() {
        let store = InMemoryPantryStore::new();
        let stored = store
            .add_all(
                "u1",
                &[
                    PantryEntry::candidate("bread", None),
                    PantryEntry::candidate("butter", Some("250 g".to_string())),
                ],
            )
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|e| !e.id.is_empty()));
    }

    fn rest_store(server: &Server) -> RestPantryStore {
        RestPantryStore::new(&StoreConfig {
            base_url: Some(server.url()),
            api_key: Some("anon-key".to_string()),
            table: "pantry".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_rest_list() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/pantry")
            .match_header("apikey", "anon-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("user_id".into(), "eq.u1".into()),
                Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 42, "ingredient": "eggs", "quantity": "12"}]"#)
            .create_async()
            .await;

        let entries = rest_store(&server).list("u1").await.unwrap();
        assert_eq!(entries[0].id, "42");
        assert_eq!(entries[0].ingredient_name, "eggs");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rest_add() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/pantry")
            .match_header("prefer", "return=representation")
            .match_body(Matcher::PartialJsonString(
                r#"{"user_id": "u1", "ingredient": "milk", "quantity": null}"#.to_string(),
            ))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": "a1", "ingredient": "milk", "quantity": null}]"#)
            .create_async()
            .await;

        let entry = rest_store(&server).add("u1", " milk ", None).await.unwrap();
        assert_eq!(entry.id, "a1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_in_memory_add_all_rejects_whole_batch() {
        let store = InMemoryPantryStore::new();
        let err = store
            .add_all(
                "u1",
                &[
                    PantryEntry::candidate("bread", None),
                    PantryEntry::candidate("  ", None),
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PantryError::ValidationError(_)));
        assert!(store.list("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rest_add_all_posts_one_array() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/pantry")
            .match_header("prefer", "return=representation")
            .match_body(Matcher::JsonString(
                r#"[
                    {"user_id": "u1", "ingredient": "eggs", "quantity": "12"},
                    {"user_id": "u1", "ingredient": "milk", "quantity": null}
                ]"#
                .to_string(),
            ))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id": 1, "ingredient": "eggs", "quantity": "12"},
                    {"id": 2, "ingredient": "milk", "quantity": null}]"#,
            )
            .expect(1)
            .create_async()
            .await;

        let stored = rest_store(&server)
            .add_all(
                "u1",
                &[
                    PantryEntry::candidate("eggs", Some("12".to_string())),
                    PantryEntry::candidate("milk", None),
                ],
            )
            .await
            .unwrap();

        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].id, "2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rest_add_all_failure_is_single_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/pantry")
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;

        let err = rest_store(&server)
            .add_all(
                "u1",
                &[
                    PantryEntry::candidate("eggs", None),
                    PantryEntry::candidate("milk", None),
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PantryError::StoreError(ref m) if m.contains("boom")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rest_delete_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/pantry")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.a1".into()))
            .with_status(401)
            .with_body("permission denied")
            .create_async()
            .await;

        let err = rest_store(&server).delete("u1", "a1").await.unwrap_err();
        assert!(matches!(err, PantryError::StoreError(ref m) if m.contains("permission denied")));
    }
}
