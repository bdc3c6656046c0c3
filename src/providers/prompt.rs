/// System prompt for recipe suggestions.
///
/// Loaded from `recipe_prompt.txt` at compile time so the wording can be
/// edited without dealing with Rust string syntax.
pub const RECIPE_PROMPT: &str = include_str!("recipe_prompt.txt");

/// System prompt for pulling ingredient names out of a recipe.
pub const INGREDIENT_EXTRACTION_PROMPT: &str =
    "Extract only the ingredient names used in this recipe. Return as a comma-separated list.";

/// Prompt sent alongside a grocery receipt image.
pub const RECEIPT_SCAN_PROMPT: &str = r#"You're a smart kitchen assistant. This is a grocery receipt. Extract the items and quantities in this JSON format:
[
  { "ingredient": "eggs", "quantity": "12" },
  { "ingredient": "milk", "quantity": "1 gallon" }
]
"#;

/// Build the user message listing the ingredients on hand.
pub fn build_recipe_prompt(ingredients: &[String]) -> String {
    format!(
        "I have the following ingredients: {}.",
        ingredients.join(", ")
    )
}
