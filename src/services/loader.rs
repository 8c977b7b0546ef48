use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::time::Instant;

use crate::{
    error::{AppError, AppResult},
    models::{normalize_ingredients, Complexity, Recipe},
    services::{directions::parse_directions, source::DatasetSource},
};

pub const TITLE_COLUMN: &str = "recipe_title";
pub const CATEGORY_COLUMN: &str = "category";
pub const INGREDIENTS_COLUMN: &str = "cleaned_ingredients_filtered";
pub const STEPS_COLUMN: &str = "num_steps";
pub const NUM_INGREDIENTS_COLUMN: &str = "num_ingredients";
pub const DIRECTIONS_COLUMN: &str = "directions";

/// Step-count quartiles that decide each recipe's complexity tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplexityThresholds {
    pub q1: f64,
    pub q3: f64,
}

impl ComplexityThresholds {
    /// Computes Q1/Q3 over the whole dataset; `None` for an empty dataset
    pub fn from_steps(steps: &[u32]) -> Option<Self> {
        let mut sorted: Vec<f64> = steps.iter().map(|&s| f64::from(s)).collect();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            q1: quantile(&sorted, 0.25)?,
            q3: quantile(&sorted, 0.75)?,
        })
    }

    pub fn classify(&self, num_steps: u32) -> Complexity {
        let steps = f64::from(num_steps);
        if steps <= self.q1 {
            Complexity::Simple
        } else if steps <= self.q3 {
            Complexity::Medium
        } else {
            Complexity::Complex
        }
    }
}

/// Linear-interpolated quantile of already sorted values
///
/// Position is `(n - 1) * q`, interpolating between the two neighbouring values.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let position = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// The loaded dataset: recipe table plus the indexes derived from it
///
/// Immutable once built; shared read-only by every session.
#[derive(Debug, Clone)]
pub struct Catalog {
    recipes: Vec<Recipe>,
    headers: csv::StringRecord,
    records: Vec<csv::StringRecord>,
    ingredients: Vec<String>,
    categories: Vec<String>,
    thresholds: ComplexityThresholds,
    fingerprint: String,
}

/// Column positions resolved from the header row
struct Columns {
    title: usize,
    category: usize,
    ingredients: Option<usize>,
    steps: usize,
    num_ingredients: Option<usize>,
    directions: usize,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> AppResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                AppError::DataUnavailable(format!("required column '{}' is missing", name))
            })
        };

        Ok(Self {
            title: require(TITLE_COLUMN)?,
            category: require(CATEGORY_COLUMN)?,
            ingredients: find(INGREDIENTS_COLUMN),
            steps: require(STEPS_COLUMN)?,
            num_ingredients: find(NUM_INGREDIENTS_COLUMN),
            directions: require(DIRECTIONS_COLUMN)?,
        })
    }
}

/// A row before its complexity is known
struct PendingRecipe {
    title: String,
    category: String,
    ingredients_raw: String,
    num_steps: u32,
    num_ingredients: Option<u32>,
    directions: String,
}

/// Parses a non-negative integer cell, accepting whole floats such as `5.0`
fn parse_count(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    if let Ok(value) = cell.parse::<u32>() {
        return Some(value);
    }
    let value = cell.parse::<f64>().ok()?;
    (value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX)).then_some(value as u32)
}

impl Catalog {
    /// Builds the catalog from raw CSV bytes
    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| AppError::DataUnavailable(format!("unreadable header row: {}", e)))?
            .clone();
        let columns = Columns::resolve(&headers)?;

        let mut records = Vec::new();
        let mut pending = Vec::new();

        for (index, record) in reader.records().enumerate() {
            let record = record
                .map_err(|e| AppError::DataUnavailable(format!("corrupt dataset: {}", e)))?;
            let cell = |i: usize| record.get(i).unwrap_or_default();
            let row_number = index + 2;

            let num_steps = parse_count(cell(columns.steps)).ok_or_else(|| {
                AppError::DataUnavailable(format!(
                    "row {}: '{}' is not a valid {}",
                    row_number,
                    cell(columns.steps),
                    STEPS_COLUMN
                ))
            })?;

            pending.push(PendingRecipe {
                title: cell(columns.title).to_string(),
                category: cell(columns.category).to_string(),
                ingredients_raw: columns
                    .ingredients
                    .map(|i| cell(i).to_string())
                    .unwrap_or_default(),
                num_steps,
                num_ingredients: columns.num_ingredients.and_then(|i| parse_count(cell(i))),
                directions: cell(columns.directions).to_string(),
            });
            records.push(record);
        }

        let steps: Vec<u32> = pending.iter().map(|r| r.num_steps).collect();
        let thresholds = ComplexityThresholds::from_steps(&steps)
            .ok_or_else(|| AppError::DataUnavailable("dataset contains no recipes".to_string()))?;

        let recipes: Vec<Recipe> = pending
            .into_iter()
            .map(|row| Recipe {
                ingredients: normalize_ingredients(&row.ingredients_raw),
                complexity: thresholds.classify(row.num_steps),
                directions: parse_directions(&row.directions),
                title: row.title,
                category: row.category,
                ingredients_raw: row.ingredients_raw,
                num_steps: row.num_steps,
                num_ingredients: row.num_ingredients,
            })
            .collect();

        let ingredients: BTreeSet<&str> = recipes
            .iter()
            .flat_map(|r| r.ingredients.iter().map(String::as_str))
            .collect();
        let categories: BTreeSet<&str> = recipes.iter().map(|r| r.category.as_str()).collect();

        Ok(Self {
            ingredients: ingredients.into_iter().map(String::from).collect(),
            categories: categories.into_iter().map(String::from).collect(),
            recipes,
            headers,
            records,
            thresholds,
            fingerprint: hex::encode(Sha256::digest(bytes)),
        })
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Sorted distinct normalised ingredient tokens
    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    /// Sorted distinct categories
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn thresholds(&self) -> ComplexityThresholds {
        self.thresholds
    }

    /// SHA-256 of the dataset bytes; identifies the dataset version
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Header row as read from the source
    pub fn headers(&self) -> &csv::StringRecord {
        &self.headers
    }

    /// Rows as read from the source, parallel to [`Catalog::recipes`]
    pub fn records(&self) -> &[csv::StringRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// First recipe with exactly this title
    pub fn find_by_title(&self, title: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.title == title)
    }

    pub fn has_ingredient(&self, ingredient: &str) -> bool {
        self.ingredients
            .binary_search_by(|probe| probe.as_str().cmp(ingredient))
            .is_ok()
    }
}

/// Loads the dataset from `source` and derives complexity tiers and universes
pub async fn load(source: &dyn DatasetSource) -> AppResult<Catalog> {
    let start = Instant::now();
    let location = source.describe();

    let bytes = source.read().await.inspect_err(|e| {
        tracing::error!(source = %location, error = %e, "Failed to read dataset");
    })?;

    let catalog = Catalog::from_bytes(&bytes).inspect_err(|e| {
        tracing::error!(source = %location, error = %e, "Failed to parse dataset");
    })?;

    tracing::info!(
        source = %location,
        recipes = catalog.len(),
        ingredients = catalog.ingredients().len(),
        categories = catalog.categories().len(),
        q1 = catalog.thresholds().q1,
        q3 = catalog.thresholds().q3,
        fingerprint = %catalog.fingerprint(),
        elapsed_ms = start.elapsed().as_millis(),
        "Dataset loaded"
    );

    Ok(catalog)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Directions;
    use crate::services::source::MockDatasetSource;

    /// Four-recipe dataset used across the service tests
    pub(crate) const SAMPLE_CSV: &str = "\
recipe_title,category,cleaned_ingredients_filtered,num_steps,num_ingredients,directions
R1,Dessert,\"egg, flour\",2,2,\"['Whisk egg.', 'Fold in flour.']\"
R2,Dessert,\"egg, flour, sugar\",5,3,\"['Mix.', 'Bake.']\"
R3,Dessert,egg,8,1,Boil the egg.
R4,Dessert,,3,0,\"['Serve.']\"
";

    pub(crate) fn sample_catalog() -> Catalog {
        Catalog::from_bytes(SAMPLE_CSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let values = [2.0, 3.0, 5.0, 8.0];
        assert_eq!(quantile(&values, 0.25), Some(2.75));
        assert_eq!(quantile(&values, 0.75), Some(5.75));
        assert_eq!(quantile(&values, 0.5), Some(4.0));
        assert_eq!(quantile(&[7.0], 0.25), Some(7.0));
        assert_eq!(quantile(&[], 0.25), None);
    }

    #[test]
    fn test_thresholds_classify_boundaries() {
        let thresholds = ComplexityThresholds { q1: 3.0, q3: 6.0 };
        assert_eq!(thresholds.classify(3), Complexity::Simple);
        assert_eq!(thresholds.classify(4), Complexity::Medium);
        assert_eq!(thresholds.classify(6), Complexity::Medium);
        assert_eq!(thresholds.classify(7), Complexity::Complex);
    }

    #[test]
    fn test_catalog_complexities_use_global_quartiles() {
        let catalog = sample_catalog();
        assert_eq!(
            catalog.thresholds(),
            ComplexityThresholds { q1: 2.75, q3: 5.75 }
        );

        let tiers: Vec<(&str, Complexity)> = catalog
            .recipes()
            .iter()
            .map(|r| (r.title.as_str(), r.complexity))
            .collect();
        assert_eq!(
            tiers,
            vec![
                ("R1", Complexity::Simple),
                ("R2", Complexity::Medium),
                ("R3", Complexity::Complex),
                ("R4", Complexity::Medium),
            ]
        );
    }

    #[test]
    fn test_catalog_universes_sorted_and_distinct() {
        let catalog = sample_catalog();
        assert_eq!(catalog.ingredients(), ["egg", "flour", "sugar"]);
        assert_eq!(catalog.categories(), ["Dessert"]);
        assert!(catalog.has_ingredient("flour"));
        assert!(!catalog.has_ingredient("salmon"));
    }

    #[test]
    fn test_catalog_parses_directions_and_counts() {
        let catalog = sample_catalog();
        let r1 = catalog.find_by_title("R1").unwrap();
        assert_eq!(
            r1.directions,
            Directions::Steps(vec!["Whisk egg.".to_string(), "Fold in flour.".to_string()])
        );
        assert_eq!(r1.num_ingredients, Some(2));

        let r3 = catalog.find_by_title("R3").unwrap();
        assert_eq!(
            r3.directions,
            Directions::Unparsed("Boil the egg.".to_string())
        );

        let r4 = catalog.find_by_title("R4").unwrap();
        assert!(r4.ingredients.is_empty());
    }

    #[test]
    fn test_missing_ingredients_column_yields_empty_universe() {
        let csv = "recipe_title,category,num_steps,directions\nToast,Breakfast,1,Toast it.\n";
        let catalog = Catalog::from_bytes(csv.as_bytes()).unwrap();
        assert!(catalog.ingredients().is_empty());
        assert_eq!(catalog.recipes()[0].num_ingredients, None);
    }

    #[test]
    fn test_missing_required_column_is_data_unavailable() {
        let csv = "recipe_title,category,directions\nToast,Breakfast,Toast it.\n";
        let err = Catalog::from_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(msg) if msg.contains("num_steps")));
    }

    #[test]
    fn test_invalid_steps_is_data_unavailable() {
        let csv = "recipe_title,category,num_steps,directions\nToast,Breakfast,many,Toast it.\n";
        let err = Catalog::from_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(msg) if msg.contains("row 2")));
    }

    #[test]
    fn test_whole_float_steps_accepted() {
        assert_eq!(parse_count("5.0"), Some(5));
        assert_eq!(parse_count(" 7 "), Some(7));
        assert_eq!(parse_count("2.5"), None);
        assert_eq!(parse_count("-1"), None);
    }

    #[test]
    fn test_empty_dataset_is_data_unavailable() {
        let csv = "recipe_title,category,num_steps,directions\n";
        let err = Catalog::from_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::DataUnavailable(_)));
    }

    #[test]
    fn test_ragged_row_is_data_unavailable() {
        let csv = "recipe_title,category,num_steps,directions\nToast,Breakfast\n";
        assert!(matches!(
            Catalog::from_bytes(csv.as_bytes()),
            Err(AppError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = sample_catalog();
        let b = sample_catalog();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let changed = SAMPLE_CSV.replace("R1", "R1b");
        let c = Catalog::from_bytes(changed.as_bytes()).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let mut source = MockDatasetSource::new();
        source
            .expect_read()
            .returning(|| Ok(SAMPLE_CSV.as_bytes().to_vec()));
        source
            .expect_describe()
            .return_const("memory".to_string());

        let catalog = load(&source).await.unwrap();
        assert_eq!(catalog.len(), 4);
    }

    #[tokio::test]
    async fn test_load_propagates_unavailable_source() {
        let mut source = MockDatasetSource::new();
        source
            .expect_read()
            .returning(|| Err(AppError::DataUnavailable("missing".to_string())));
        source
            .expect_describe()
            .return_const("memory".to_string());

        let result = load(&source).await;
        assert!(matches!(result, Err(AppError::DataUnavailable(_))));
    }
}
