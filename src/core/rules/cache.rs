//! LRU cache for rule decisions
//!
//! Wraps a [`PathRuleMatcher`] so repeated requests skip the rule scan. The
//! key covers everything a decision depends on: operation, normalized path,
//! and the full auth context.

use super::guard::AuthContext;
use super::matcher::{Decision, PathRuleMatcher};
use super::rule::Operation;
use crate::error::Result;
use crate::validation::ResourcePath;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Cache key for a decision
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    operation: Operation,
    path: ResourcePath,
    auth: AuthContext,
}

/// LRU cache of decisions
pub struct DecisionCache {
    cache: LruCache<CacheKey, Decision>,
}

impl DecisionCache {
    /// Create a cache; a zero capacity is bumped to one entry
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        DecisionCache {
            cache: LruCache::new(capacity),
        }
    }

    fn get(&mut self, key: &CacheKey) -> Option<Decision> {
        self.cache.get(key).copied()
    }

    fn put(&mut self, key: CacheKey, decision: Decision) {
        self.cache.put(key, decision);
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// A matcher with a shared decision cache
///
/// Safe to share across threads; the lock is only held for cache lookups and
/// inserts, never while rules are evaluated. Invalid paths are never cached.
pub struct CachedMatcher {
    matcher: PathRuleMatcher,
    cache: Mutex<DecisionCache>,
}

impl CachedMatcher {
    /// Capacity used when the config leaves `cache_capacity` unset
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(matcher: PathRuleMatcher, capacity: usize) -> Self {
        CachedMatcher {
            matcher,
            cache: Mutex::new(DecisionCache::new(capacity)),
        }
    }

    /// Build from the matcher's own `cache_capacity`, or [`Self::DEFAULT_CAPACITY`]
    pub fn from_config(matcher: PathRuleMatcher) -> Self {
        let capacity = matcher
            .config()
            .cache_capacity
            .unwrap_or(Self::DEFAULT_CAPACITY);
        Self::new(matcher, capacity)
    }

    pub fn matcher(&self) -> &PathRuleMatcher {
        &self.matcher
    }

    /// Same contract as [`PathRuleMatcher::evaluate`]
    pub fn evaluate(
        &self,
        operation: Operation,
        path: &str,
        auth: &AuthContext,
    ) -> Result<Decision> {
        let path = ResourcePath::parse(path)?;
        let key = CacheKey {
            operation,
            path,
            auth: auth.clone(),
        };

        if let Some(hit) = self.cache.lock().get(&key) {
            return Ok(hit);
        }

        let decision = self.matcher.evaluate_path(operation, &key.path, auth);
        self.cache.lock().put(key, decision);
        Ok(decision)
    }

    /// Evaluate and turn a deny into `PermissionDenied`
    pub fn check_access(&self, operation: Operation, path: &str, auth: &AuthContext) -> Result<()> {
        self.evaluate(operation, path, auth)?.enforce(operation, path)
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.lock().len()
    }
}
