use std::collections::{HashMap, VecDeque};
use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::FilterSelection;
use crate::services::matching::Match;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Engine output for one selection against one dataset version
    Filter {
        fingerprint: String,
        selection: FilterSelection,
    },
}

impl CacheKey {
    pub fn filter(fingerprint: &str, selection: &FilterSelection) -> Self {
        CacheKey::Filter {
            fingerprint: fingerprint.to_string(),
            selection: selection.clone(),
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Filter {
                fingerprint,
                selection,
            } => write!(
                f,
                "filter:{}:{}:{:?}:{:?}",
                fingerprint,
                selection.threshold.percent(),
                String::from(selection.category.clone()),
                selection.ingredients
            ),
        }
    }
}

struct CacheInner {
    entries: HashMap<CacheKey, Arc<Vec<Match>>>,
    order: VecDeque<CacheKey>,
}

/// Bounded in-memory memo of filter results
///
/// Entries are evicted oldest-first once `capacity` is reached. A capacity of
/// zero disables caching entirely.
#[derive(Clone)]
pub struct FilterCache {
    capacity: usize,
    inner: Arc<RwLock<CacheInner>>,
}

impl FilterCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Arc::new(RwLock::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Vec<Match>>> {
        let inner = self.inner.read().await;
        inner.entries.get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, value: Arc<Vec<Match>>) {
        if self.capacity == 0 {
            return;
        }

        let mut inner = self.inner.write().await;
        if inner.entries.contains_key(&key) {
            inner.entries.insert(key, value);
            return;
        }

        while inner.order.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(key, value);
    }

    /// Returns the cached value for `key`, computing and storing it on a miss
    pub async fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Arc<Vec<Match>>
    where
        F: FnOnce() -> Vec<Match>,
    {
        if let Some(cached) = self.get(&key).await {
            tracing::debug!(key = %key, "Filter cache hit");
            return cached;
        }

        let value = Arc::new(compute());
        self.insert(key, value.clone()).await;
        value
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryFilter, Threshold};

    fn key(n: usize) -> CacheKey {
        let selection = FilterSelection::new(
            [format!("ingredient-{}", n)],
            CategoryFilter::All,
            Threshold::new(50).unwrap(),
        );
        CacheKey::filter("abc", &selection)
    }

    fn value(index: usize) -> Arc<Vec<Match>> {
        Arc::new(vec![Match { index, score: None }])
    }

    #[test]
    fn test_cache_key_display_filter() {
        let selection = FilterSelection::new(
            ["Flour", "egg"],
            CategoryFilter::Only("Dessert".to_string()),
            Threshold::new(75).unwrap(),
        );
        let key = CacheKey::filter("deadbeef", &selection);
        assert_eq!(
            format!("{}", key),
            r#"filter:deadbeef:75:"Dessert":{"egg", "flour"}"#
        );
    }

    #[test]
    fn test_cache_key_ignores_input_order() {
        let threshold = Threshold::new(40).unwrap();
        let a = FilterSelection::new(["flour", "egg"], CategoryFilter::All, threshold);
        let b = FilterSelection::new(["egg", "flour"], CategoryFilter::All, threshold);
        assert_eq!(CacheKey::filter("abc", &a), CacheKey::filter("abc", &b));
    }

    #[test]
    fn test_cache_key_distinguishes_embedded_separators() {
        let threshold = Threshold::new(50).unwrap();
        let split = FilterSelection::new(["egg", "flour"], CategoryFilter::All, threshold);
        let joined = FilterSelection::new(["egg,flour"], CategoryFilter::All, threshold);
        assert_ne!(
            CacheKey::filter("abc", &split),
            CacheKey::filter("abc", &joined)
        );

        let piped = FilterSelection::new(
            ["egg"],
            CategoryFilter::Only("Dessert|50".to_string()),
            threshold,
        );
        let plain = FilterSelection::new(
            ["egg"],
            CategoryFilter::Only("Dessert".to_string()),
            threshold,
        );
        assert_ne!(
            CacheKey::filter("abc", &piped),
            CacheKey::filter("abc", &plain)
        );
    }

    #[test]
    fn test_cache_hit_skips_compute() {
        tokio_test::block_on(async {
            let cache = FilterCache::new(4);
            let first = cache.get_or_compute(key(1), || vec![Match { index: 7, score: None }]).await;
            let second = cache
                .get_or_compute(key(1), || panic!("should have been cached"))
                .await;
            assert_eq!(first, second);
        });
    }

    #[tokio::test]
    async fn test_cache_evicts_oldest() {
        let cache = FilterCache::new(2);
        cache.insert(key(1), value(1)).await;
        cache.insert(key(2), value(2)).await;
        cache.insert(key(3), value(3)).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&key(1)).await.is_none());
        assert_eq!(cache.get(&key(3)).await, Some(value(3)));
    }

    #[tokio::test]
    async fn test_reinsert_does_not_evict() {
        let cache = FilterCache::new(2);
        cache.insert(key(1), value(1)).await;
        cache.insert(key(2), value(2)).await;
        cache.insert(key(2), value(5)).await;

        assert_eq!(cache.get(&key(1)).await, Some(value(1)));
        assert_eq!(cache.get(&key(2)).await, Some(value(5)));
    }

    #[tokio::test]
    async fn test_zero_capacity_disables_cache() {
        let cache = FilterCache::new(0);
        let computed = cache.get_or_compute(key(1), || vec![]).await;
        assert!(computed.is_empty());
        assert_eq!(cache.len().await, 0);
    }
}
