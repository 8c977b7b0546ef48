use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Complexity, Directions, Recipe};

/// Snapshot of a recipe's display fields taken when it was favorited
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Favorite {
    pub title: String,
    pub ingredients: String,
    pub directions: Directions,
    pub complexity: Complexity,
    pub saved_at: DateTime<Utc>,
}

impl Favorite {
    pub fn snapshot(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            ingredients: recipe.ingredients_raw.clone(),
            directions: recipe.directions.clone(),
            complexity: recipe.complexity,
            saved_at: Utc::now(),
        }
    }
}

/// Result of adding a favorite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// A session's favorites list, unique by title, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Favorites(Vec<Favorite>);

impl Favorites {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, title: &str) -> bool {
        self.0.iter().any(|f| f.title == title)
    }

    /// Adds the favorite unless one with the same title is already saved
    pub fn add(&mut self, favorite: Favorite) -> AddOutcome {
        if self.contains(&favorite.title) {
            return AddOutcome::AlreadyPresent;
        }
        self.0.push(favorite);
        AddOutcome::Added
    }

    /// Removes the favorite with this title, returning whether one was removed
    pub fn remove(&mut self, title: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|f| f.title != title);
        self.0.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Favorite> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
