use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::cache::{CacheKey, FilterCache};
use crate::config::Config;
use crate::error::AppResult;
use crate::middleware::SessionId;
use crate::models::{CategoryFilter, FilterSelection, Session, Threshold};
use crate::services::{matching::Match, Catalog, MatchEngine};

/// Shared application state
///
/// The catalog is read-only after load and shared by every session; each
/// session's selection and favorites live in `sessions`, keyed by id, until the
/// session is ended or sits idle past the configured timeout.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub engine: MatchEngine,
    pub cache: FilterCache,
    pub sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    default_selection: Arc<FilterSelection>,
    session_ttl: Option<chrono::Duration>,
}

impl AppState {
    /// Creates state around a loaded catalog
    pub fn new(catalog: Catalog, config: &Config) -> AppResult<Self> {
        let starters: Vec<&str> = config
            .starter_ingredients
            .iter()
            .map(|name| name.trim())
            .filter(|name| catalog.has_ingredient(&name.to_lowercase()))
            .collect();

        let default_selection = FilterSelection::new(
            starters,
            CategoryFilter::All,
            Threshold::new(i64::from(config.default_threshold))?,
        );

        tracing::info!(
            starter_ingredients = ?default_selection.ingredients,
            threshold = default_selection.threshold.percent(),
            policy = ?config.empty_selection_policy,
            session_idle_timeout_secs = config.session_idle_timeout_secs,
            "Session defaults configured"
        );

        Ok(Self {
            catalog: Arc::new(catalog),
            engine: MatchEngine::new(config.empty_selection_policy),
            cache: FilterCache::new(config.filter_cache_capacity),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            default_selection: Arc::new(default_selection),
            session_ttl: config.session_idle_timeout(),
        })
    }

    /// Selection a new session starts with
    pub fn default_selection(&self) -> &FilterSelection {
        &self.default_selection
    }

    /// Runs `f` against the session, creating it with defaults on first use.
    ///
    /// Idle sessions are dropped first, so an expired id starts over with defaults
    /// and no favorites.
    pub async fn with_session<R>(&self, id: SessionId, f: impl FnOnce(&mut Session) -> R) -> R {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        if let Some(ttl) = self.session_ttl {
            let before = sessions.len();
            sessions.retain(|_, session| !session.is_idle(now, ttl));
            let expired = before - sessions.len();
            if expired > 0 {
                tracing::info!(expired, remaining = sessions.len(), "Expired idle sessions");
            }
        }

        let session = sessions
            .entry(id)
            .or_insert_with(|| Session::new(self.default_selection.as_ref().clone()));
        session.last_seen = now;
        f(session)
    }

    /// Discards the session's selection and favorites; returns whether it existed
    pub async fn end_session(&self, id: SessionId) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Filters the catalog, reusing a memoised result for an identical selection
    pub async fn run_filter(&self, selection: &FilterSelection) -> Arc<Vec<Match>> {
        let key = CacheKey::filter(self.catalog.fingerprint(), selection);
        self.cache
            .get_or_compute(key, || self.engine.filter(self.catalog.recipes(), selection))
            .await
    }
}
