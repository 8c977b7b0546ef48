use serde::Serialize;

use crate::{
    models::Complexity,
    services::loader::{Catalog, ComplexityThresholds},
};

const PREVIEW_ROWS: usize = 5;

/// Per-tier recipe counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComplexityBreakdown {
    pub simple: usize,
    pub medium: usize,
    pub complex: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRow {
    pub recipe_title: String,
    pub category: String,
    pub num_ingredients: Option<u32>,
    pub num_steps: u32,
    pub complexity: Complexity,
    pub ingredients: String,
}

/// Summary of the loaded dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub total_recipes: usize,
    pub total_ingredients: usize,
    pub total_categories: usize,
    pub average_steps: f64,
    /// `average_steps` formatted to one decimal place
    pub average_steps_display: String,
    pub thresholds: ComplexityThresholds,
    pub complexity: ComplexityBreakdown,
    pub preview: Vec<PreviewRow>,
}

pub fn summarize(catalog: &Catalog) -> DatasetOverview {
    let recipes = catalog.recipes();

    let total_steps: u64 = recipes.iter().map(|r| u64::from(r.num_steps)).sum();
    let average_steps = if recipes.is_empty() {
        0.0
    } else {
        total_steps as f64 / recipes.len() as f64
    };

    let mut complexity = ComplexityBreakdown::default();
    for recipe in recipes {
        match recipe.complexity {
            Complexity::Simple => complexity.simple += 1,
            Complexity::Medium => complexity.medium += 1,
            Complexity::Complex => complexity.complex += 1,
        }
    }

    let preview = recipes
        .iter()
        .take(PREVIEW_ROWS)
        .map(|r| PreviewRow {
            recipe_title: r.title.clone(),
            category: r.category.clone(),
            num_ingredients: r.num_ingredients,
            num_steps: r.num_steps,
            complexity: r.complexity,
            ingredients: r.ingredients_raw.clone(),
        })
        .collect();

    DatasetOverview {
        total_recipes: recipes.len(),
        total_ingredients: catalog.ingredients().len(),
        total_categories: catalog.categories().len(),
        average_steps,
        average_steps_display: format!("{:.1}", average_steps),
        thresholds: catalog.thresholds(),
        complexity,
        preview,
    }
}
