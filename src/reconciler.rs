use crate::collaborators::IngredientExtractor;
use crate::error::PantryError;
use crate::model::{normalize_ingredient_name, Recipe, ShoppingListEntry};
use futures::future::join_all;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::timeout;

/// Work out which recipe ingredients are missing from the pantry.
///
/// Extraction runs concurrently for every recipe. A recipe whose extraction
/// fails or times out contributes nothing; the others still count. Entries are
/// emitted in first-seen order following the recipe sequence, not completion order.
pub async fn reconcile(
    recipes: &[Recipe],
    pantry: &[String],
    extractor: &dyn IngredientExtractor,
    call_timeout: Option<Duration>,
) -> Vec<ShoppingListEntry> {
    if recipes.is_empty() {
        return Vec::new();
    }

    let extractions = recipes.iter().map(|recipe| async move {
        let text = recipe.extraction_text();
        let call = extractor.extract_ingredients(&text);
        let result = match call_timeout {
            Some(limit) => match timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(format!("timed out after {:?}", limit).into()),
            },
            None => call.await,
        };

        match result {
            Ok(names) => {
                debug!("'{}' uses {} ingredients", recipe.title, names.len());
                names
            }
            Err(e) => {
                let skipped =
                    PantryError::ExtractionUnavailable(format!("'{}': {}", recipe.title, e));
                warn!("{}, skipping recipe", skipped);
                Vec::new()
            }
        }
    });

    // join_all yields results in input order regardless of which call finished first
    let extracted = join_all(extractions).await;

    reconcile_extracted(recipes, pantry, &extracted)
}

/// Merge per-recipe ingredient lists into a shopping list.
///
/// `extracted[i]` holds the ingredient names found in `recipes[i]`.
pub fn reconcile_extracted(
    recipes: &[Recipe],
    pantry: &[String],
    extracted: &[Vec<String>],
) -> Vec<ShoppingListEntry> {
    let known: HashSet<String> = pantry
        .iter()
        .map(|name| normalize_ingredient_name(name))
        .collect();

    let mut entries: Vec<ShoppingListEntry> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (recipe, names) in recipes.iter().zip(extracted) {
        for name in names {
            let name = normalize_ingredient_name(name);
            if name.is_empty() || known.contains(&name) {
                continue;
            }

            match positions.get(&name) {
                Some(&index) => {
                    let titles = &mut entries[index].recipe_titles;
                    if !titles.contains(&recipe.title) {
                        titles.push(recipe.title.clone());
                    }
                }
                None => {
                    positions.insert(name.clone(), entries.len());
                    entries.push(ShoppingListEntry {
                        ingredient_name: name,
                        recipe_titles: vec![recipe.title.clone()],
                    });
                }
            }
        }
    }

    entries
}
