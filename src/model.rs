use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Canonical form of an ingredient name: trimmed and lower-cased.
///
/// Synonyms are not folded together, so "scallion" and "green onion" stay distinct.
pub fn normalize_ingredient_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A recipe suggestion produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub instructions: Vec<String>,
    #[serde(default)]
    pub substitutes: Vec<String>,
}

impl Recipe {
    /// Text handed to the ingredient extractor: the title followed by every instruction.
    pub fn extraction_text(&self) -> String {
        format!("{}: {}", self.title, self.instructions.join(" "))
    }
}

/// One ingredient the user has on hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryEntry {
    pub id: String,
    #[serde(rename = "ingredient")]
    pub ingredient_name: String,
    #[serde(default)]
    pub quantity: Option<String>,
}

impl PantryEntry {
    /// An entry that has not been stored yet; the store assigns its id.
    pub fn candidate(ingredient_name: impl Into<String>, quantity: Option<String>) -> Self {
        Self {
            id: String::new(),
            ingredient_name: ingredient_name.into(),
            quantity,
        }
    }
}

/// An ingredient missing from the pantry together with the recipes that need it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    #[serde(rename = "ingredient")]
    pub ingredient_name: String,
    #[serde(rename = "recipes")]
    pub recipe_titles: Vec<String>,
}

/// Recipes and the shopping list computed from them in the same run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShoppingPlan {
    pub recipes: Vec<Recipe>,
    #[serde(rename = "shoppingList")]
    pub shopping_list: Vec<ShoppingListEntry>,
}

impl ShoppingPlan {
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty() && self.shopping_list.is_empty()
    }

    /// Plain-text shopping list, one ingredient per line.
    pub fn shopping_list_text(&self) -> String {
        self.shopping_list
            .iter()
            .map(|entry| entry.ingredient_name.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A line item read off a grocery receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub ingredient: String,
    #[serde(default, deserialize_with = "deserialize_quantity")]
    pub quantity: Option<String>,
}

/// Receipt quantities come back as strings, bare numbers or null depending on the model.
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
