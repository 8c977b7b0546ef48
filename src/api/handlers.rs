use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::SessionId;
use crate::models::{
    AddOutcome, CategoryFilter, Complexity, Directions, Favorite, FilterSelection, Recipe,
    Threshold,
};
use crate::services::{
    export::{export_csv, EXPORT_FILENAME},
    matching::{resolve, Match},
    overview::{summarize, DatasetOverview},
};

use super::AppState;

// Request/Response types

/// Filter choices as sent by a client
#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Category name, or `"All Categories"` / absent for no restriction
    #[serde(default)]
    pub category: Option<String>,
    /// Whole percent; range-checked by [`Threshold::new`]
    pub threshold: i64,
}

impl TryFrom<FilterRequest> for FilterSelection {
    type Error = AppError;

    fn try_from(request: FilterRequest) -> AppResult<Self> {
        let threshold = Threshold::new(request.threshold)?;
        Ok(FilterSelection::new(
            request.ingredients,
            CategoryFilter::from(request.category),
            threshold,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub position: usize,
    pub title: String,
    pub category: String,
    pub complexity: Complexity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub count: usize,
    pub results: Vec<RecipeSummary>,
}

impl FilterResponse {
    fn build(recipes: &[Recipe], matches: &[Match]) -> Self {
        let results: Vec<RecipeSummary> = resolve(recipes, matches)
            .into_iter()
            .map(|ranked| RecipeSummary {
                position: ranked.position,
                title: ranked.recipe.title.clone(),
                category: ranked.recipe.category.clone(),
                complexity: ranked.recipe.complexity,
                match_score: ranked.score,
            })
            .collect();

        Self {
            count: results.len(),
            results,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeDetailResponse {
    pub title: String,
    pub category: String,
    pub complexity: Complexity,
    pub num_steps: u32,
    pub num_ingredients: Option<u32>,
    pub ingredients: Vec<String>,
    pub directions: Directions,
}

impl From<&Recipe> for RecipeDetailResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            category: recipe.category.clone(),
            complexity: recipe.complexity,
            num_steps: recipe.num_steps,
            num_ingredients: recipe.num_ingredients,
            ingredients: recipe
                .display_ingredients()
                .into_iter()
                .map(String::from)
                .collect(),
            directions: recipe.directions.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct AddFavoriteResponse {
    pub already_present: bool,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub ended: bool,
}

#[derive(Debug, Serialize)]
pub struct RemoveFavoriteResponse {
    pub removed: bool,
    pub count: usize,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Sorted ingredient universe
pub async fn get_ingredients(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.ingredients().to_vec())
}

/// Sorted category universe
pub async fn get_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.categories().to_vec())
}

pub async fn get_overview(State(state): State<AppState>) -> Json<DatasetOverview> {
    Json(summarize(&state.catalog))
}

/// Full dataset download
pub async fn export_dataset(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let body = export_csv(&state.catalog)?;
    tracing::info!(bytes = body.len(), "Dataset exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        body,
    ))
}

/// Detail view of the first recipe with this title
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<Json<RecipeDetailResponse>> {
    let recipe = state
        .catalog
        .find_by_title(&title)
        .ok_or_else(|| AppError::NotFound(format!("recipe '{}'", title)))?;
    Ok(Json(RecipeDetailResponse::from(recipe)))
}

/// Stateless filter over the catalog
pub async fn filter(
    State(state): State<AppState>,
    Json(request): Json<FilterRequest>,
) -> AppResult<Json<FilterResponse>> {
    let selection = FilterSelection::try_from(request)?;
    let matches = state.run_filter(&selection).await;
    Ok(Json(FilterResponse::build(state.catalog.recipes(), &matches)))
}

/// Current selection of the calling session
pub async fn get_selection(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Json<FilterSelection> {
    Json(state.with_session(session_id, |s| s.selection.clone()).await)
}

/// Replaces the session selection and returns the matching recipes
pub async fn update_selection(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Json(request): Json<FilterRequest>,
) -> AppResult<Json<FilterResponse>> {
    let selection = FilterSelection::try_from(request)?;

    tracing::info!(
        session_id = %session_id,
        ingredients = selection.ingredients.len(),
        category = ?selection.category,
        threshold = selection.threshold.percent(),
        "Applying filters"
    );

    state
        .with_session(session_id, |s| s.selection = selection.clone())
        .await;

    let matches = state.run_filter(&selection).await;
    Ok(Json(FilterResponse::build(state.catalog.recipes(), &matches)))
}

/// Results for the session's current selection
pub async fn get_results(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Json<FilterResponse> {
    let selection = state.with_session(session_id, |s| s.selection.clone()).await;
    let matches = state.run_filter(&selection).await;
    Json(FilterResponse::build(state.catalog.recipes(), &matches))
}

pub async fn get_favorites(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Json<Vec<Favorite>> {
    let favorites = state
        .with_session(session_id, |s| {
            s.favorites.iter().cloned().collect::<Vec<Favorite>>()
        })
        .await;
    Json(favorites)
}

/// Saves a snapshot of the recipe to the session favorites
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Json(request): Json<AddFavoriteRequest>,
) -> AppResult<(StatusCode, Json<AddFavoriteResponse>)> {
    let recipe = state
        .catalog
        .find_by_title(&request.title)
        .ok_or_else(|| AppError::NotFound(format!("recipe '{}'", request.title)))?;

    let (outcome, count) = state
        .with_session(session_id, |s| {
            let outcome = s.favorites.add(Favorite::snapshot(recipe));
            (outcome, s.favorites.len())
        })
        .await;

    let status = match outcome {
        AddOutcome::Added => {
            tracing::info!(session_id = %session_id, title = %request.title, "Added to favorites");
            StatusCode::CREATED
        }
        AddOutcome::AlreadyPresent => {
            tracing::warn!(session_id = %session_id, title = %request.title, "Already in favorites");
            StatusCode::OK
        }
    };

    Ok((
        status,
        Json(AddFavoriteResponse {
            already_present: outcome == AddOutcome::AlreadyPresent,
            count,
        }),
    ))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
    Path(title): Path<String>,
) -> Json<RemoveFavoriteResponse> {
    let (removed, count) = state
        .with_session(session_id, |s| (s.favorites.remove(&title), s.favorites.len()))
        .await;

    tracing::info!(session_id = %session_id, title = %title, removed, "Removed from favorites");

    Json(RemoveFavoriteResponse { removed, count })
}

/// Ends the calling session, discarding its selection and favorites
pub async fn end_session(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> Json<EndSessionResponse> {
    let ended = state.end_session(session_id).await;
    tracing::info!(session_id = %session_id, ended, "Session ended");
    Json(EndSessionResponse { ended })
}
