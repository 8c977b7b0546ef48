mod favorite;
mod recipe;
mod selection;
mod session;

pub use favorite::{AddOutcome, Favorite, Favorites};
pub use recipe::{normalize_ingredients, Complexity, Directions, Recipe};
pub use selection::{CategoryFilter, FilterSelection, Threshold, ALL_CATEGORIES};
pub use session::Session;
