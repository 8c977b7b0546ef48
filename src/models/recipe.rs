use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

/// Complexity tier derived from a recipe's step count relative to the dataset quartiles
///
/// Variants are declared in display order, so `Ord` sorts Simple < Medium < Complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "Simple",
            Complexity::Medium => "Medium",
            Complexity::Complex => "Complex",
        }
    }
}

impl Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cooking directions, parsed once at load time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Directions {
    /// The stored text was a list literal of instruction strings
    Steps(Vec<String>),
    /// The stored text could not be read as a list; shown verbatim
    Unparsed(String),
}

impl Directions {
    /// Trimmed steps in order, or `None` when the directions are an opaque string
    pub fn steps(&self) -> Option<Vec<&str>> {
        match self {
            Directions::Steps(steps) => Some(steps.iter().map(|s| s.trim()).collect()),
            Directions::Unparsed(_) => None,
        }
    }
}

/// One row of the recipe dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub title: String,
    pub category: String,
    /// Comma-separated ingredient list as stored in the dataset
    pub ingredients_raw: String,
    /// Lowercased, trimmed, non-empty ingredient tokens
    pub ingredients: BTreeSet<String>,
    pub num_steps: u32,
    /// Only used for display summaries
    pub num_ingredients: Option<u32>,
    pub directions: Directions,
    pub complexity: Complexity,
}

impl Recipe {
    /// Ingredient names in their stored order, for detail views
    pub fn display_ingredients(&self) -> Vec<&str> {
        self.ingredients_raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Splits a raw ingredient string into its normalised token set
pub fn normalize_ingredients(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_ordering() {
        let mut tiers = vec![Complexity::Complex, Complexity::Simple, Complexity::Medium];
        tiers.sort();
        assert_eq!(
            tiers,
            vec![Complexity::Simple, Complexity::Medium, Complexity::Complex]
        );
    }

    #[test]
    fn test_complexity_serialization() {
        let json = serde_json::to_string(&Complexity::Medium).unwrap();
        assert_eq!(json, "\"Medium\"");
        assert_eq!(Complexity::Complex.to_string(), "Complex");
    }

    #[test]
    fn test_normalize_ingredients() {
        let tokens = normalize_ingredients(" Egg, flour ,,SUGAR,  ,egg");
        let expected: BTreeSet<String> = ["egg", "flour", "sugar"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_normalize_ingredients_empty() {
        assert!(normalize_ingredients("").is_empty());
        assert!(normalize_ingredients(" , ,").is_empty());
    }

    #[test]
    fn test_directions_steps_are_trimmed() {
        let directions = Directions::Steps(vec![" Mix. ".to_string(), "Bake.".to_string()]);
        assert_eq!(directions.steps(), Some(vec!["Mix.", "Bake."]));
        assert_eq!(Directions::Unparsed("Just cook".to_string()).steps(), None);
    }

    #[test]
    fn test_directions_serialization() {
        let json = serde_json::to_value(Directions::Unparsed("stir".to_string())).unwrap();
        assert_eq!(json["kind"], "unparsed");
        assert_eq!(json["value"], "stir");
    }
}
