//! Ingredient-driven recipe search.
//!
//! The loader turns a recipe CSV into an immutable [`services::Catalog`] with
//! complexity tiers and ingredient/category universes. The [`services::MatchEngine`]
//! ranks recipes against a session's ingredient selection. The `api` module
//! exposes both over HTTP with per-session selection and favorites.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod services;
