//! Friendly-name resolver with a per-endpoint memo

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::Result;

/// Raw key → display name
pub type NameMap = BTreeMap<String, String>;

/// External service proposing display names for raw JSON keys
#[async_trait]
pub trait NameSuggester: Send + Sync {
    async fn suggest(&self, keys: &[String]) -> Result<NameMap>;
}

/// Suggester that keeps every key as is
pub struct IdentitySuggester;

#[async_trait]
impl NameSuggester for IdentitySuggester {
    async fn suggest(&self, keys: &[String]) -> Result<NameMap> {
        Ok(identity(keys))
    }
}

pub fn identity(keys: &[String]) -> NameMap {
    keys.iter().map(|k| (k.clone(), k.clone())).collect()
}

/// Memo of resolved names keyed by endpoint identity. Never evicted.
#[derive(Default)]
pub struct FriendlyNameCache {
    entries: Mutex<HashMap<String, NameMap>>,
}

impl FriendlyNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cache_key: &str) -> Option<NameMap> {
        self.entries.lock().ok()?.get(cache_key).cloned()
    }

    pub fn insert(&self, cache_key: impl Into<String>, names: NameMap) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(cache_key.into(), names);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves display names, calling the suggester at most once per cache key
/// on success. Failures degrade to the identity mapping and are not cached.
pub struct NameResolver {
    suggester: Arc<dyn NameSuggester>,
    cache: FriendlyNameCache,
}

impl NameResolver {
    pub fn new(suggester: Arc<dyn NameSuggester>) -> Self {
        NameResolver {
            suggester,
            cache: FriendlyNameCache::new(),
        }
    }

    pub fn cache(&self) -> &FriendlyNameCache {
        &self.cache
    }

    pub async fn resolve(&self, cache_key: &str, keys: &[String]) -> NameMap {
        if let Some(names) = self.cache.get(cache_key) {
            tracing::debug!(cache_key, "Friendly names served from cache");
            return names;
        }

        if keys.is_empty() {
            return NameMap::new();
        }

        // The lock is released here; concurrent misses on one key both call out.
        match self.suggester.suggest(keys).await {
            Ok(names) => {
                self.cache.insert(cache_key, names.clone());
                names
            }
            Err(e) => {
                tracing::warn!(cache_key, error = %e, "Name suggestion failed, using raw keys");
                identity(keys)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExplorerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl NameSuggester for Counting {
        async fn suggest(&self, keys: &[String]) -> Result<NameMap> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ExplorerError::NameSuggestion("model offline".into()));
            }
            Ok(keys.iter().map(|k| (k.clone(), k.to_uppercase())).collect())
        }
    }

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[tokio::test]
    async fn test_second_resolve_hits_cache() {
        let suggester = Arc::new(Counting { calls: AtomicUsize::new(0), fail: false });
        let resolver = NameResolver::new(suggester.clone());

        let first = resolver.resolve("ai-suggestions:/users", &keys(&["id", "email"])).await;
        let second = resolver.resolve("ai-suggestions:/users", &keys(&["other"])).await;

        assert_eq!(suggester.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(first.get("email").map(String::as_str), Some("EMAIL"));
    }

    #[tokio::test]
    async fn test_empty_keys_skip_suggester() {
        let suggester = Arc::new(Counting { calls: AtomicUsize::new(0), fail: false });
        let resolver = NameResolver::new(suggester.clone());

        assert!(resolver.resolve("k", &[]).await.is_empty());
        assert_eq!(suggester.calls.load(Ordering::SeqCst), 0);
        assert!(resolver.cache().is_empty());
    }

    #[tokio::test]
    async fn test_failure_degrades_and_is_not_cached() {
        let suggester = Arc::new(Counting { calls: AtomicUsize::new(0), fail: true });
        let resolver = NameResolver::new(suggester.clone());

        let names = resolver.resolve("k", &keys(&["id"])).await;
        assert_eq!(names.get("id").map(String::as_str), Some("id"));
        assert!(resolver.cache().is_empty());

        resolver.resolve("k", &keys(&["id"])).await;
        assert_eq!(suggester.calls.load(Ordering::SeqCst), 2);
    }

    proptest::proptest! {
        #[test]
        fn at_most_one_suggestion_per_cache_key(
            sequence in proptest::collection::vec(0usize..4, 1..24)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let suggester = Arc::new(Counting { calls: AtomicUsize::new(0), fail: false });
            let resolver = NameResolver::new(suggester.clone());

            runtime.block_on(async {
                for endpoint in &sequence {
                    resolver.resolve(&format!("ai-suggestions:/e{}", endpoint), &keys(&["id"])).await;
                }
            });

            let distinct: std::collections::HashSet<_> = sequence.iter().collect();
            proptest::prop_assert_eq!(suggester.calls.load(Ordering::SeqCst), distinct.len());
            proptest::prop_assert_eq!(resolver.cache().len(), distinct.len());
        }
    }
}
