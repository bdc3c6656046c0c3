use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Provider used for recipe generation and ingredient extraction
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Fallback configuration for automatic provider switching
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Vision model used to read grocery receipts
    #[serde(default)]
    pub receipt: ReceiptConfig,
    /// Nearby store search
    #[serde(default)]
    pub places: PlacesConfig,
    /// Hosted pantry table
    #[serde(default)]
    pub store: StoreConfig,
    /// Timeout for each external call in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for a specific AI provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    pub enabled: bool,
    /// Model identifier (e.g., "gpt-4o-mini", "gemini-2.0-flash")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or OpenAI-compatible endpoints)
    pub base_url: Option<String>,
}

/// Configuration for provider fallback and retry behavior
#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    /// Whether fallback is enabled
    #[serde(default)]
    pub enabled: bool,
    /// Order of providers to try (first to last)
    #[serde(default)]
    pub order: Vec<String>,
    /// Number of retry attempts per provider before fallback
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Initial delay between retries in milliseconds (grows linearly per attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            order: Vec::new(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Configuration for the receipt vision model
#[derive(Debug, Deserialize, Clone)]
pub struct ReceiptConfig {
    #[serde(default = "default_receipt_model")]
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            model: default_receipt_model(),
            api_key: None,
            base_url: None,
        }
    }
}

/// Configuration for nearby store search
#[derive(Debug, Deserialize, Clone)]
pub struct PlacesConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Search radius in meters
    #[serde(default = "default_radius")]
    pub radius: u32,
    /// Maximum number of places returned
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            radius: default_radius(),
            limit: default_limit(),
        }
    }
}

/// Configuration for the hosted pantry table
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// REST endpoint root, e.g. "https://<project>.supabase.co/rest/v1"
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            table: default_table(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "google".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_receipt_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_radius() -> u32 {
    5000
}

fn default_limit() -> u32 {
    5
}

fn default_table() -> String {
    "pantry".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with PANTRY_CHEF__ prefix
    /// 2. pantry-chef.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: PANTRY_CHEF__PROVIDERS__OPENAI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Per-call timeout for external collaborators
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
            fallback: FallbackConfig::default(),
            receipt: ReceiptConfig::default(),
            places: PlacesConfig::default(),
            store: StoreConfig::default(),
            timeout: default_timeout(),
        }
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("pantry-chef").required(false))
        // Use double underscore for nested: PANTRY_CHEF__PROVIDERS__OPENAI__API_KEY
        .add_source(
            Environment::with_prefix("PANTRY_CHEF")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
