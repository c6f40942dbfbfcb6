//! Compiled pattern cache for `@Regexp` directives.

use crate::config::PatternConfig;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Compiles `@Regexp` patterns, optionally memoizing them by pattern text.
///
/// The cache is bounded: once `cache_capacity` patterns are stored, new
/// patterns are still compiled but no longer inserted. A poisoned lock
/// degrades to compiling on every call.
#[derive(Debug)]
pub struct PatternCache {
    config: PatternConfig,
    compiled: RwLock<HashMap<String, Arc<Regex>>>,
}

impl PatternCache {
    /// Create an empty cache with the given settings.
    #[must_use]
    pub fn new(config: PatternConfig) -> Self {
        Self {
            config,
            compiled: RwLock::new(HashMap::new()),
        }
    }

    /// Settings in effect.
    #[must_use]
    pub const fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Compile (or fetch) a pattern.
    pub fn compile(&self, pattern: &str) -> Result<Arc<Regex>, regex::Error> {
        if !self.config.cache_enabled {
            return self.build(pattern).map(Arc::new);
        }

        if let Some(hit) = self.lookup(pattern) {
            return Ok(hit);
        }

        tracing::debug!(pattern, "pattern cache miss");
        let compiled = Arc::new(self.build(pattern)?);
        self.insert(pattern, &compiled);
        Ok(compiled)
    }

    /// Number of cached patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.compiled.read().map_or(0, |guard| guard.len())
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached pattern.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.compiled.write() {
            guard.clear();
        }
    }

    fn build(&self, pattern: &str) -> Result<Regex, regex::Error> {
        RegexBuilder::new(pattern)
            .size_limit(self.config.size_limit)
            .build()
    }

    fn lookup(&self, pattern: &str) -> Option<Arc<Regex>> {
        match self.compiled.read() {
            Ok(guard) => guard.get(pattern).cloned(),
            Err(_) => {
                tracing::warn!("pattern cache lock poisoned; compiling without cache");
                None
            },
        }
    }

    fn insert(&self, pattern: &str, compiled: &Arc<Regex>) {
        let Ok(mut guard) = self.compiled.write() else {
            tracing::warn!("pattern cache lock poisoned; skipping insert");
            return;
        };
        if guard.len() >= self.config.cache_capacity {
            tracing::debug!(
                capacity = self.config.cache_capacity,
                "pattern cache full; not caching"
            );
            return;
        }
        guard
            .entry(pattern.to_owned())
            .or_insert_with(|| Arc::clone(compiled));
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(PatternConfig::default())
    }
}
