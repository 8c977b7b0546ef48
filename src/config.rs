use serde::Deserialize;

use crate::services::matching::EmptySelectionPolicy;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the recipe dataset CSV
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Match threshold (percent) a new session starts with
    #[serde(default = "default_threshold")]
    pub default_threshold: u8,

    /// Ingredients pre-selected for a new session, kept only if the dataset knows them
    #[serde(default = "default_starter_ingredients")]
    pub starter_ingredients: Vec<String>,

    /// What to do with "no ingredients, all categories, positive threshold"
    #[serde(default)]
    pub empty_selection_policy: EmptySelectionPolicy,

    /// Number of memoised filter results; 0 disables the cache
    #[serde(default = "default_filter_cache_capacity")]
    pub filter_cache_capacity: usize,

    /// Seconds without a request after which a session is discarded; 0 keeps sessions forever
    #[serde(default = "default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: u64,
}

fn default_data_path() -> String {
    "data/deduplicated_recipes_with_complexity.csv".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_threshold() -> u8 {
    50
}

fn default_starter_ingredients() -> Vec<String> {
    vec!["yam".to_string(), "salmon".to_string()]
}

fn default_filter_cache_capacity() -> usize {
    256
}

fn default_session_idle_timeout_secs() -> u64 {
    1800
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            host: default_host(),
            port: default_port(),
            default_threshold: default_threshold(),
            starter_ingredients: default_starter_ingredients(),
            empty_selection_policy: EmptySelectionPolicy::default(),
            filter_cache_capacity: default_filter_cache_capacity(),
            session_idle_timeout_secs: default_session_idle_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.default_threshold > 100 {
            anyhow::bail!(
                "DEFAULT_THRESHOLD must be between 0 and 100, got {}",
                self.default_threshold
            );
        }
        Ok(())
    }

    /// Idle lifetime of a session, `None` when sessions never expire
    pub fn session_idle_timeout(&self) -> Option<chrono::Duration> {
        if self.session_idle_timeout_secs == 0 {
            return None;
        }
        chrono::Duration::from_std(std::time::Duration::from_secs(
            self.session_idle_timeout_secs,
        ))
        .ok()
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
