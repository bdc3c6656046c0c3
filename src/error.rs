use thiserror::Error;

/// Errors that can occur while planning recipes, importing receipts or talking to the pantry
#[derive(Error, Debug)]
pub enum PantryError {
    /// Recipe generation was unreachable, errored or timed out
    #[error("Recipe generation failed: {0}")]
    GenerationFailed(String),

    /// Generation succeeded but its output could not be decoded into recipes
    #[error("Malformed recipe response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    /// Ingredient extraction failed for a single recipe
    #[error("Ingredient extraction unavailable: {0}")]
    ExtractionUnavailable(String),

    /// Receipt scanning failed or produced unparsable output
    #[error("Receipt extraction failed: {0}")]
    ReceiptExtractionFailed(String),

    /// Required user input was missing or empty
    #[error("Invalid input: {0}")]
    ValidationError(String),

    /// The pantry store rejected or failed a request
    #[error("Pantry store error: {0}")]
    StoreError(String),

    /// Nearby place search failed
    #[error("Place search failed: {0}")]
    PlacesError(String),

    /// HTTP transport error
    #[error("Request failed: {0}")]
    FetchError(#[from] reqwest::Error),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

impl PantryError {
    /// Raw generation output attached to a malformed response, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            PantryError::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
