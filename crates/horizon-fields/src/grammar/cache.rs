//! Grammar caching.
//!
//! Deriving a grammar compiles up to three regular expressions, so engines
//! share compiled grammars through a cache keyed by [`GrammarKey`].

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use horizon_fields_core::logging::targets;
use parking_lot::Mutex;

use super::{GrammarKey, GroupGrammar};
use crate::error::GrammarError;

/// Global grammar cache instance.
static GLOBAL_CACHE: OnceLock<GrammarCache> = OnceLock::new();

/// The process-wide grammar cache used by edit engines.
pub fn grammar_cache() -> &'static GrammarCache {
    GLOBAL_CACHE.get_or_init(GrammarCache::new)
}

struct CachedGrammar {
    grammar: Arc<GroupGrammar>,
    last_used: u64,
}

struct CacheState {
    entries: HashMap<GrammarKey, CachedGrammar>,
    clock: u64,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Drop the least recently used half of the entries.
    fn evict_half(&mut self) {
        let mut by_age: Vec<_> = self
            .entries
            .iter()
            .map(|(key, cached)| (cached.last_used, key.clone()))
            .collect();
        by_age.sort_unstable_by_key(|(last_used, _)| *last_used);
        for (_, key) in by_age.into_iter().take(self.entries.len() / 2) {
            self.entries.remove(&key);
        }
    }
}

/// Least-recently-used cache for compiled grammars.
///
/// When full, the least recently used half of the entries is dropped. Failed
/// compilations are not cached; each attempt reports its own error.
pub struct GrammarCache {
    state: Mutex<CacheState>,
    max_size: usize,
}

impl GrammarCache {
    /// Create a new grammar cache.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a cache with specific capacity.
    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::with_capacity(max_size),
                clock: 0,
            }),
            max_size: max_size.max(1),
        }
    }

    /// Return the cached grammar for `key`, compiling and caching it on a miss.
    pub fn get_or_compile(&self, key: &GrammarKey) -> Result<Arc<GroupGrammar>, GrammarError> {
        {
            let mut state = self.state.lock();
            let now = state.tick();
            if let Some(cached) = state.entries.get_mut(key) {
                cached.last_used = now;
                tracing::trace!(target: targets::GRAMMAR, pattern = key.pattern(), "grammar cache hit");
                return Ok(cached.grammar.clone());
            }
        }

        // Compile outside the lock; a racing compile of the same key is harmless.
        let grammar = Arc::new(GroupGrammar::compile(key)?);

        let mut state = self.state.lock();
        let now = state.tick();
        if !state.entries.contains_key(key) && state.entries.len() >= self.max_size {
            state.evict_half();
        }
        let cached = state.entries.entry(key.clone()).or_insert(CachedGrammar {
            grammar,
            last_used: now,
        });
        cached.last_used = now;
        Ok(cached.grammar.clone())
    }

    /// Whether a grammar for `key` is cached.
    pub fn contains(&self, key: &GrammarKey) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// Drop every cached grammar derived from `pattern`.
    pub fn invalidate(&self, pattern: &str) {
        self.state.lock().entries.retain(|k, _| k.pattern() != pattern);
    }

    /// Drop all cached grammars.
    pub fn invalidate_all(&self) {
        self.state.lock().entries.clear();
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }
}

impl Default for GrammarCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GrammarCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarCache")
            .field("len", &self.len())
            .field("max_size", &self.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(pattern: &str) -> GrammarKey {
        GrammarKey::new(pattern, [("h", None)])
    }

    #[test]
    fn cache_returns_shared_grammar() {
        let cache = GrammarCache::new();
        let a = cache.get_or_compile(&key("h.h")).unwrap();
        let b = cache.get_or_compile(&key("h.h")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_does_not_store_failures() {
        let cache = GrammarCache::new();
        assert!(cache.get_or_compile(&key("..")).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_invalidation() {
        let cache = GrammarCache::new();
        cache.get_or_compile(&key("h.h")).unwrap();
        cache.get_or_compile(&key("h-h")).unwrap();

        cache.invalidate("h.h");
        assert_eq!(cache.len(), 1);

        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_evicts_when_full() {
        let cache = GrammarCache::with_capacity(4);
        for sep in [".", "-", ":", "/", ","] {
            cache.get_or_compile(&key(&format!("h{sep}h"))).unwrap();
        }
        assert!(cache.len() <= 4);
    }

    #[test]
    fn cache_evicts_least_recently_used() {
        let cache = GrammarCache::with_capacity(4);
        for pattern in ["h.h", "h-h", "h:h", "h/h"] {
            cache.get_or_compile(&key(pattern)).unwrap();
        }
        cache.get_or_compile(&key("h.h")).unwrap();
        cache.get_or_compile(&key("h,h")).unwrap();

        assert_eq!(cache.len(), 3);
        assert!(cache.contains(&key("h.h")));
        assert!(cache.contains(&key("h/h")));
        assert!(cache.contains(&key("h,h")));
        assert!(!cache.contains(&key("h-h")));
        assert!(!cache.contains(&key("h:h")));
    }
}
