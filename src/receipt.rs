use crate::collaborators::ReceiptScanner;
use crate::config::AppConfig;
use crate::error::PantryError;
use crate::model::{PantryEntry, ReceiptItem};
use crate::normalizer::strip_code_fences;
use crate::providers::ProviderFactory;
use log::{debug, error, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Turns a photographed grocery receipt into candidate pantry entries.
///
/// Nothing is persisted here. Either every line item is returned or the
/// import fails as a whole.
pub struct ReceiptImporter {
    scanner: Arc<dyn ReceiptScanner>,
    call_timeout: Option<Duration>,
}

impl ReceiptImporter {
    pub fn new(scanner: Arc<dyn ReceiptScanner>) -> Self {
        Self {
            scanner,
            call_timeout: None,
        }
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = Some(call_timeout);
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, PantryError> {
        let scanner = ProviderFactory::receipt_scanner(config)
            .map_err(|e| PantryError::BuilderError(e.to_string()))?;
        Ok(Self::new(scanner).with_timeout(config.call_timeout()))
    }

    /// Scan one receipt image and map its line items to pantry entries
    pub async fn import_receipt(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<Vec<PantryEntry>, PantryError> {
        if image.is_empty() {
            return Err(PantryError::ValidationError(
                "No receipt image provided".to_string(),
            ));
        }

        let call = self.scanner.scan_receipt(image, mime_type);
        let result = match self.call_timeout {
            Some(limit) => timeout(limit, call).await.map_err(|_| {
                PantryError::ReceiptExtractionFailed(format!("timed out after {:?}", limit))
            })?,
            None => call.await,
        };
        let raw = result.map_err(|e| PantryError::ReceiptExtractionFailed(e.to_string()))?;

        let items = parse_receipt_items(&raw).map_err(|e| {
            error!("Failed to parse receipt response: {}", raw);
            e
        })?;
        debug!("Receipt yielded {} line items", items.len());

        Ok(items
            .into_iter()
            .filter_map(|item| {
                if item.ingredient.trim().is_empty() {
                    warn!("Skipping receipt line without an ingredient name");
                    return None;
                }
                Some(PantryEntry::candidate(item.ingredient, item.quantity))
            })
            .collect())
    }

    /// Read an image file from disk and import it
    pub async fn import_receipt_file(&self, path: &Path) -> Result<Vec<PantryEntry>, PantryError> {
        let image = tokio::fs::read(path).await.map_err(|e| {
            PantryError::ValidationError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        self.import_receipt(&image, mime_type_for(path)).await
    }
}

/// Decode the vision reply as a JSON array of `{ingredient, quantity}` items
pub fn parse_receipt_items(raw: &str) -> Result<Vec<ReceiptItem>, PantryError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(&cleaned)
        .map_err(|e| PantryError::ReceiptExtractionFailed(format!("unparsable receipt items: {}", e)))
}

/// Guess an image MIME type from the file extension, defaulting to JPEG
pub fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}
