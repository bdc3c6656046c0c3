//! Turns raw recipe-generation output into [`Recipe`] records.
//!
//! Two decoders are tried in a fixed order. The structured decoder expects a
//! JSON array of recipe objects. When that fails, the prose decoder splits a
//! numbered list (`1. ...`, `2. ...`) into one recipe per item. The prose path
//! is lossy: it only recovers a heuristic title and keeps the whole item as a
//! single instruction.

use crate::error::PantryError;
use crate::model::Recipe;
use log::debug;
use serde::Deserialize;

/// Which decoder produced the recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    Structured,
    Prose,
}

#[derive(Deserialize)]
struct RawRecipe {
    title: Option<String>,
    summary: Option<String>,
    instructions: Option<Vec<String>>,
    substitutes: Option<Vec<String>>,
}

/// Decode generation output into recipes.
pub fn normalize(raw_text: &str) -> Result<Vec<Recipe>, PantryError> {
    normalize_with_strategy(raw_text).map(|(_, recipes)| recipes)
}

/// Decode generation output, reporting which decoder succeeded.
pub fn normalize_with_strategy(
    raw_text: &str,
) -> Result<(DecodeStrategy, Vec<Recipe>), PantryError> {
    let sanitized = strip_code_fences(raw_text);

    let structured_error = match decode_structured(&sanitized) {
        Ok(recipes) => return Ok((DecodeStrategy::Structured, recipes)),
        Err(e) => e,
    };
    debug!(
        "Structured decode failed ({}), falling back to numbered prose",
        structured_error
    );

    match decode_prose(&sanitized) {
        Ok(recipes) => Ok((DecodeStrategy::Prose, recipes)),
        Err(prose_error) => Err(PantryError::MalformedResponse {
            reason: format!("{}; {}", structured_error, prose_error),
            raw: raw_text.to_string(),
        }),
    }
}

/// Remove markdown code fences and a stray leading `json` language tag.
pub fn strip_code_fences(raw_text: &str) -> String {
    let mut cleaned = String::with_capacity(raw_text.len());
    let mut rest = raw_text;

    while let Some(pos) = rest.find("```") {
        cleaned.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        if rest.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
            rest = &rest[4..];
            rest = rest.strip_prefix('\n').unwrap_or(rest);
        }
    }
    cleaned.push_str(rest);

    let trimmed = cleaned.trim();
    let untagged = match trimmed.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => {
            let after = &trimmed[4..];
            match after.chars().next() {
                None => after,
                Some(c) if c.is_whitespace() || c == '[' => after,
                Some(_) => trimmed,
            }
        }
        _ => trimmed,
    };

    untagged.trim().to_string()
}

/// Decode a strict JSON array of recipe objects.
///
/// `title` (non-empty) and `instructions` are required on every element;
/// `summary` and `substitutes` default to empty.
pub fn decode_structured(text: &str) -> Result<Vec<Recipe>, String> {
    let raw: Vec<RawRecipe> =
        serde_json::from_str(text).map_err(|e| format!("not a JSON recipe array: {}", e))?;

    raw.into_iter()
        .enumerate()
        .map(|(index, item)| {
            let title = item
                .title
                .filter(|t| !t.is_empty())
                .ok_or_else(|| format!("recipe {} has no title", index))?;
            let instructions = item
                .instructions
                .ok_or_else(|| format!("recipe {} has no instructions", index))?;

            Ok(Recipe {
                title,
                summary: item.summary.unwrap_or_default(),
                instructions,
                substitutes: item.substitutes.unwrap_or_default(),
            })
        })
        .collect()
}

/// Split a numbered list into one recipe per item.
///
/// The title is the text before the first `" - "`, or the whole item.
pub fn decode_prose(text: &str) -> Result<Vec<Recipe>, String> {
    let recipes: Vec<Recipe> = split_numbered(text)
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let title = segment
                .split_once(" - ")
                .map_or(segment, |(title, _)| title);
            Recipe {
                title: title.to_string(),
                summary: String::new(),
                instructions: vec![segment.to_string()],
                substitutes: Vec::new(),
            }
        })
        .collect();

    if recipes.is_empty() {
        return Err("no numbered recipes found".to_string());
    }
    Ok(recipes)
}

/// Split on an optional newline, one digit, a period and a run of whitespace.
fn split_numbered(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let is_marker = bytes[i].is_ascii_digit()
            && bytes.get(i + 1) == Some(&b'.')
            && bytes.get(i + 2).is_some_and(u8::is_ascii_whitespace);

        if !is_marker {
            i += 1;
            continue;
        }

        let end = if i > start && bytes[i - 1] == b'\n' {
            i - 1
        } else {
            i
        };
        segments.push(&text[start..end]);

        let mut next = i + 2;
        while next < bytes.len() && bytes[next].is_ascii_whitespace() {
            next += 1;
        }
        start = next;
        i = next;
    }
    segments.push(&text[start..]);

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(title: &str, steps: &[&str]) -> Recipe {
        Recipe {
            title: title.to_string(),
            summary: format!("{} summary", title),
            instructions: steps.iter().map(|s| s.to_string()).collect(),
            substitutes: vec!["butter for oil".to_string()],
        }
    }

    #[test]
    fn test_structured_recovers_input() {
        let recipes = vec![
            recipe("Shakshuka", &["Simmer tomatoes", "Crack in eggs"]),
            recipe("Frittata", &["Whisk eggs", "Bake"]),
        ];
        let raw = serde_json::to_string(&recipes).unwrap();

        let (strategy, decoded) = normalize_with_strategy(&raw).unwrap();
        assert_eq!(strategy, DecodeStrategy::Structured);
        assert_eq!(decoded, recipes);
    }

    #[test]
    fn test_structured_defaults_optional_fields() {
        let raw = r#"[{"title": "Toast", "instructions": ["Toast the bread"]}]"#;
        let recipes = normalize(raw).unwrap();

        assert_eq!(recipes[0].title, "Toast");
        assert_eq!(recipes[0].summary, "");
        assert!(recipes[0].substitutes.is_empty());
    }

    #[test]
    fn test_structured_rejects_missing_instructions() {
        let err = decode_structured(r#"[{"title": "Toast"}]"#).unwrap_err();
        assert!(err.contains("no instructions"));

        let err = decode_structured(r#"[{"title": "", "instructions": []}]"#).unwrap_err();
        assert!(err.contains("no title"));
    }

    #[test]
    fn test_code_fences_are_stripped() {
        let raw = "```json\n[{\"title\": \"Soup\", \"instructions\": [\"Boil\"]}]\n```";
        let (strategy, recipes) = normalize_with_strategy(raw).unwrap();

        assert_eq!(strategy, DecodeStrategy::Structured);
        assert_eq!(recipes[0].title, "Soup");
    }

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("```JSON\n[]\n```"), "[]");
        assert_eq!(strip_code_fences("  ```\n[]```  "), "[]");
        assert_eq!(strip_code_fences("json\n[]"), "[]");
        assert_eq!(strip_code_fences("```\njson\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("Jsonified salad"), "Jsonified salad");
    }

    #[test]
    fn test_prose_fallback_splits_numbered_list() {
        let raw = "1. Pancakes - fluffy and quick\n2. French Toast - uses stale bread\n3. Omelette";
        let (strategy, recipes) = normalize_with_strategy(raw).unwrap();

        assert_eq!(strategy, DecodeStrategy::Prose);
        assert_eq!(recipes.len(), 3);
        assert_eq!(recipes[0].title, "Pancakes");
        assert_eq!(
            recipes[0].instructions,
            vec!["Pancakes - fluffy and quick".to_string()]
        );
        assert_eq!(recipes[1].title, "French Toast");
        assert_eq!(recipes[2].title, "Omelette");
        assert!(recipes.iter().all(|r| r.summary.is_empty() && r.substitutes.is_empty()));
    }

    #[test]
    fn test_prose_keeps_leading_text_as_segment() {
        let raw = "Here are some ideas:\n1. Rice Bowl - quick\n2. Fried Rice - leftovers";
        let recipes = decode_prose(raw).unwrap();

        assert_eq!(recipes.len(), 3);
        assert_eq!(recipes[0].title, "Here are some ideas:");
        assert_eq!(recipes[1].title, "Rice Bowl");
    }

    #[test]
    fn test_every_prose_recipe_has_instructions() {
        let raw = "1.   Soup\n\n2. Stew - hearty\n3. Salad - fresh";
        let recipes = decode_prose(raw).unwrap();
        assert_eq!(recipes.len(), 3);
        assert!(recipes.iter().all(|r| !r.instructions.is_empty()));
        assert_eq!(recipes[0].title, "Soup");
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let err = normalize("```json\n```").unwrap_err();
        match err {
            PantryError::MalformedResponse { raw, .. } => assert_eq!(raw, "```json\n```"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_array_is_structured() {
        let (strategy, recipes) = normalize_with_strategy("[]").unwrap();
        assert_eq!(strategy, DecodeStrategy::Structured);
        assert!(recipes.is_empty());
    }

    #[test]
    fn test_whitespace_title_stays_structured() {
        let (strategy, recipes) =
            normalize_with_strategy(r#"[{"title": " ", "instructions": ["Boil"]}]"#).unwrap();
        assert_eq!(strategy, DecodeStrategy::Structured);
        assert_eq!(recipes[0].title, " ");
        assert_eq!(recipes[0].instructions, vec!["Boil"]);
    }

    #[test]
    fn test_empty_title_falls_back_to_prose() {
        let (strategy, _) =
            normalize_with_strategy(r#"[{"title": "", "instructions": ["Boil"]}]"#).unwrap();
        assert_eq!(strategy, DecodeStrategy::Prose);
    }
}
