//! Session-scoped embedding cache.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::{CacheStats, Embedding};

/// Thread-safe memo of embeddings keyed by exact text.
///
/// The cache is created by the caller and handed to every
/// [`CachedEmbedder`](crate::CachedEmbedder) of one evaluation session; it is
/// never global.
///
/// # Thread Safety
///
/// Uses `RwLock` for interior mutability, allowing concurrent reads
/// and exclusive writes. Embeddings are computed outside the lock, so a
/// slow provider never blocks readers of other texts.
///
/// # Examples
///
/// ```
/// use text_tree_embed::{EmbedError, Embedding, EmbeddingCache};
///
/// let cache = EmbeddingCache::new();
/// let first = cache
///     .get_or_try_insert_with("methods", || Ok::<_, EmbedError>(Embedding::new(vec![1.0])))
///     .unwrap();
/// let again = cache
///     .get_or_try_insert_with("methods", || Ok::<_, EmbedError>(Embedding::new(vec![2.0])))
///     .unwrap();
///
/// assert_eq!(first, again);
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: RwLock<HashMap<String, Arc<Embedding>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EmbeddingCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache behind an `Arc`, ready to share.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns the cached embedding for `text`, if any.
    ///
    /// Does not touch the hit/miss counters.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Arc<Embedding>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(text)
            .cloned()
    }

    /// Stores an embedding, replacing any previous one for `text`.
    pub fn insert(&self, text: impl Into<String>, embedding: Embedding) -> Arc<Embedding> {
        let embedding = Arc::new(embedding);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(text.into(), Arc::clone(&embedding));
        embedding
    }

    /// Returns the cached embedding for `text`, computing it with `compute`
    /// on a miss.
    ///
    /// If two threads miss on the same text concurrently, both compute and
    /// the first stored value wins, so every caller observes the same vector.
    /// Failures are returned and nothing is cached.
    ///
    /// # Errors
    ///
    /// Returns whatever `compute` returns.
    pub fn get_or_try_insert_with<E, F>(&self, text: &str, compute: F) -> Result<Arc<Embedding>, E>
    where
        F: FnOnce() -> Result<Embedding, E>,
    {
        if let Some(found) = self.get(text) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(found);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let computed = Arc::new(compute()?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(
            entries.entry(text.to_string()).or_insert(computed),
        ))
    }

    /// Returns the distinct texts of `texts` that are not cached, in first
    /// occurrence order.
    ///
    /// Counts one hit per distinct cached text and one miss per distinct
    /// missing text, so a batch lookup moves the counters the same way as
    /// the equivalent single lookups.
    #[must_use]
    pub fn missing<'t>(&self, texts: &[&'t str]) -> Vec<&'t str> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut seen = HashSet::with_capacity(texts.len());
        let mut missing = Vec::new();
        for &text in texts {
            if !seen.insert(text) {
                continue;
            }
            if entries.contains_key(text) {
                self.hits.fetch_add(1, Ordering::Relaxed);
            } else {
                self.misses.fetch_add(1, Ordering::Relaxed);
                missing.push(text);
            }
        }
        missing
    }

    /// Stores an embedding unless `text` is already cached, and returns the
    /// stored value.
    pub fn insert_absent(&self, text: &str, embedding: Embedding) -> Arc<Embedding> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            entries
                .entry(text.to_string())
                .or_insert_with(|| Arc::new(embedding)),
        )
    }

    /// Returns the number of cached texts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached embedding and resets the counters.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Returns a snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmbedError;

    #[test]
    fn miss_then_hit() {
        let cache = EmbeddingCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            cache
                .get_or_try_insert_with("x", || {
                    calls += 1;
                    Ok::<_, EmbedError>(Embedding::new(vec![1.0, 0.0]))
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (2, 1, 1));
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = EmbeddingCache::new();
        let err = cache
            .get_or_try_insert_with("x", || {
                Err(EmbedError::Unavailable {
                    reason: "down".into(),
                })
            })
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(cache.is_empty());
        assert!(cache.get("x").is_none());
    }

    #[test]
    fn first_stored_value_wins() {
        let cache = EmbeddingCache::new();
        cache.insert("x", Embedding::new(vec![1.0]));
        let found = cache
            .get_or_try_insert_with("x", || Ok::<_, EmbedError>(Embedding::new(vec![2.0])))
            .unwrap();
        assert_eq!(found.as_slice(), &[1.0]);
    }

    #[test]
    fn missing_counts_distinct_texts() {
        let cache = EmbeddingCache::new();
        cache.insert("a", Embedding::zeros(1));
        let missing = cache.missing(&["b", "a", "c", "b", "a"]);
        assert_eq!(missing, vec!["b", "c"]);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 2));

        let stored = cache.insert_absent("a", Embedding::new(vec![5.0]));
        assert!(stored.is_zero());
    }

    #[test]
    fn clear_resets_everything() {
        let cache = EmbeddingCache::new();
        cache.insert("x", Embedding::zeros(1));
        let _ = cache.get_or_try_insert_with("x", || Ok::<_, EmbedError>(Embedding::zeros(1)));
        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
