use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{FilterSelection, Recipe, Threshold};

/// How to treat a selection with no ingredients, all categories and a positive threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySelectionPolicy {
    /// Return nothing
    #[default]
    Reject,
    /// Return every recipe, as with a zero threshold
    MatchAll,
}

/// One recipe that passed the filter, identified by its row in the table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub index: usize,
    /// Fraction of the selected ingredients the recipe uses; `None` when no
    /// ingredients were selected
    pub score: Option<f64>,
}

/// A filter result bound to its recipe, with a dense display position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedRecipe<'a> {
    pub position: usize,
    pub recipe: &'a Recipe,
    pub score: Option<f64>,
}

/// Fraction of `selected` found in `ingredients`; 0 for a recipe without ingredients
pub fn match_score(selected: &BTreeSet<String>, ingredients: &BTreeSet<String>) -> f64 {
    if selected.is_empty() || ingredients.is_empty() {
        return 0.0;
    }
    selected.intersection(ingredients).count() as f64 / selected.len() as f64
}

/// `matched / selected >= threshold / 100`, in integer arithmetic
fn meets_threshold(matched: usize, selected: usize, threshold: Threshold) -> bool {
    matched * 100 >= usize::from(threshold.percent()) * selected
}

/// Ingredient matching and filtering over a recipe table
///
/// Pure: the same table and selection always give the same matches in the same order,
/// and the table is never modified.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEngine {
    policy: EmptySelectionPolicy,
}

impl MatchEngine {
    pub fn new(policy: EmptySelectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> EmptySelectionPolicy {
        self.policy
    }

    /// Returns the recipes satisfying `selection`, ordered Simple < Medium < Complex
    /// and otherwise in table order
    pub fn filter(&self, recipes: &[Recipe], selection: &FilterSelection) -> Vec<Match> {
        let candidates: Vec<usize> = recipes
            .iter()
            .enumerate()
            .filter(|(_, recipe)| selection.category.matches(&recipe.category))
            .map(|(index, _)| index)
            .collect();

        if candidates.is_empty() {
            tracing::debug!(category = ?selection.category, "No recipes in category");
            return Vec::new();
        }

        let selected = &selection.ingredients;
        let threshold = selection.threshold;

        if selected.is_empty()
            && selection.category.is_all()
            && threshold.percent() > 0
            && self.policy == EmptySelectionPolicy::Reject
        {
            tracing::debug!(
                threshold = threshold.percent(),
                "Empty ingredient selection with positive threshold yields no recipes"
            );
            return Vec::new();
        }

        let mut matches: Vec<Match> = if selected.is_empty() {
            candidates
                .into_iter()
                .map(|index| Match { index, score: None })
                .collect()
        } else {
            candidates
                .into_iter()
                .filter_map(|index| {
                    let ingredients = &recipes[index].ingredients;
                    let matched = if ingredients.is_empty() {
                        0
                    } else {
                        selected.intersection(ingredients).count()
                    };

                    if !meets_threshold(matched, selected.len(), threshold) {
                        return None;
                    }
                    // exact pantry match: nothing beyond the selection
                    if threshold.is_strict() && ingredients.len() != selected.len() {
                        return None;
                    }

                    Some(Match {
                        index,
                        score: Some(match_score(selected, ingredients)),
                    })
                })
                .collect()
        };

        // stable: ties keep table order
        matches.sort_by_key(|m| recipes[m.index].complexity);

        tracing::debug!(
            selected = selected.len(),
            threshold = threshold.percent(),
            matched = matches.len(),
            "Filter applied"
        );

        matches
    }

    /// Filters and binds each match to its recipe with a 0-based position
    pub fn rank<'a>(
        &self,
        recipes: &'a [Recipe],
        selection: &FilterSelection,
    ) -> Vec<RankedRecipe<'a>> {
        resolve(recipes, &self.filter(recipes, selection))
    }
}

/// Binds matches to their recipes, numbering them densely from 0
pub fn resolve<'a>(recipes: &'a [Recipe], matches: &[Match]) -> Vec<RankedRecipe<'a>> {
    matches
        .iter()
        .enumerate()
        .filter_map(|(position, m)| {
            recipes.get(m.index).map(|recipe| RankedRecipe {
                position,
                recipe,
                score: m.score,
            })
        })
        .collect()
}
