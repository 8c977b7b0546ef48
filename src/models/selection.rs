use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{AppError, AppResult};

/// Sentinel category value meaning "do not restrict by category"
pub const ALL_CATEGORIES: &str = "All Categories";

/// Category restriction of a filter selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }
}

impl From<Option<String>> for CategoryFilter {
    fn from(value: Option<String>) -> Self {
        match value {
            None => CategoryFilter::All,
            Some(name) if name == ALL_CATEGORIES => CategoryFilter::All,
            Some(name) => CategoryFilter::Only(name),
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        match value {
            CategoryFilter::All => ALL_CATEGORIES.to_string(),
            CategoryFilter::Only(name) => name,
        }
    }
}

/// Minimum match score, in whole percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Threshold(u8);

impl Threshold {
    pub const MAX: u8 = 100;

    pub fn new(percent: i64) -> AppResult<Self> {
        u8::try_from(percent)
            .ok()
            .filter(|p| *p <= Self::MAX)
            .map(Self)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "threshold must be between 0 and 100, got {}",
                    percent
                ))
            })
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    pub fn is_strict(&self) -> bool {
        self.0 == Self::MAX
    }
}

/// A session's current filter choices
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilterSelection {
    pub ingredients: BTreeSet<String>,
    pub category: CategoryFilter,
    pub threshold: Threshold,
}

impl FilterSelection {
    /// Builds a selection, lowercasing and trimming ingredient names
    pub fn new<I, S>(ingredients: I, category: CategoryFilter, threshold: Threshold) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ingredients = ingredients
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        Self {
            ingredients,
            category,
            threshold,
        }
    }
}
