use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Favorites, FilterSelection};

/// Per-session mutable state; never shared between sessions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub selection: FilterSelection,
    pub favorites: Favorites,
    /// Last time a request touched this session
    pub last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new(selection: FilterSelection) -> Self {
        Self {
            selection,
            favorites: Favorites::new(),
            last_seen: Utc::now(),
        }
    }

    /// Whether the session has been idle for at least `ttl` as of `now`
    pub fn is_idle(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.last_seen >= ttl
    }
}
