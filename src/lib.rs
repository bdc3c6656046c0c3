pub mod builder;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod pantry;
pub mod places;
pub mod planner;
pub mod providers;
pub mod receipt;
pub mod reconciler;

pub use builder::{PlannerBuilder, ProviderKind};
pub use config::AppConfig;
pub use error::PantryError;
pub use model::{PantryEntry, ReceiptItem, Recipe, ShoppingListEntry, ShoppingPlan};
pub use normalizer::normalize;
pub use pantry::{InMemoryPantryStore, PantryStore, RestPantryStore};
pub use places::{Place, PlacesClient};
pub use planner::ShoppingPlanner;
pub use receipt::ReceiptImporter;
pub use reconciler::reconcile;

/// Load the user's pantry and plan recipes plus a shopping list from it.
///
/// The recipes and the shopping list always come from the same run.
pub async fn plan_from_store(
    planner: &ShoppingPlanner,
    store: &dyn PantryStore,
    user_id: &str,
) -> Result<ShoppingPlan, PantryError> {
    let pantry = store.list(user_id).await?;
    planner.generate_shopping_plan(&pantry).await
}

/// Scan a receipt and store every line item it yields for the user.
///
/// Nothing is written when the scan or its parsing fails.
pub async fn import_receipt_into(
    importer: &ReceiptImporter,
    store: &dyn PantryStore,
    user_id: &str,
    image: &[u8],
    mime_type: &str,
) -> Result<Vec<PantryEntry>, PantryError> {
    let candidates = importer.import_receipt(image, mime_type).await?;
    store.add_all(user_id, &candidates).await
}
