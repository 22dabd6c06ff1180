//! Provider wrapper adding caching, retries and output validation.

use std::sync::Arc;
use std::thread;

use crate::{CacheStats, EmbedConfig, EmbedError, Embedding, EmbeddingCache, EmbeddingProvider};

/// An [`EmbeddingProvider`] behind a shared cache and a retry policy.
///
/// Every vector the provider returns is checked for the declared dimension
/// and for finite components before it is cached.
///
/// # Examples
///
/// ```
/// use text_tree_embed::{CachedEmbedder, EmbeddingCache, HashingEmbedder};
///
/// let cache = EmbeddingCache::shared();
/// let embedder = CachedEmbedder::new(HashingEmbedder::default(), cache.clone());
///
/// let a = embedder.get("results").unwrap();
/// let b = embedder.get("results").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(cache.stats().misses, 1);
/// ```
#[derive(Debug)]
pub struct CachedEmbedder<P> {
    provider: P,
    cache: Arc<EmbeddingCache>,
    config: EmbedConfig,
}

impl<P: EmbeddingProvider> CachedEmbedder<P> {
    /// Wraps `provider` with the given cache and the default retry policy.
    #[must_use]
    pub fn new(provider: P, cache: Arc<EmbeddingCache>) -> Self {
        Self::with_config(provider, cache, EmbedConfig::default())
    }

    /// Wraps `provider` with an explicit retry policy.
    #[must_use]
    pub const fn with_config(provider: P, cache: Arc<EmbeddingCache>, config: EmbedConfig) -> Self {
        Self {
            provider,
            cache,
            config,
        }
    }

    /// Returns the wrapped provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Returns the shared cache.
    #[must_use]
    pub const fn cache(&self) -> &Arc<EmbeddingCache> {
        &self.cache
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn config(&self) -> &EmbedConfig {
        &self.config
    }

    /// Returns the cache counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Returns the embedding of `text`, from the cache when possible.
    ///
    /// Cached vectors are checked against this provider too, so a cache
    /// shared with a provider of another dimension is reported instead of
    /// silently mixing vector spaces.
    ///
    /// # Errors
    ///
    /// Returns the last provider error once retries are exhausted, or a
    /// validation error (`DimensionMismatch`, `NonFinite`) immediately.
    pub fn get(&self, text: &str) -> Result<Arc<Embedding>, EmbedError> {
        let embedding = self.cache.get_or_try_insert_with(text, || self.fetch(text))?;
        self.check(text, &embedding)?;
        Ok(embedding)
    }

    /// Embeds every uncached text of `texts` with one batched provider call
    /// and stores the results.
    ///
    /// Returns the number of texts fetched.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get), plus `BatchLength` if the provider
    /// answers with the wrong number of vectors. Nothing is cached on error.
    pub fn prefetch(&self, texts: &[&str]) -> Result<usize, EmbedError> {
        let missing = self.cache.missing(texts);
        if missing.is_empty() {
            return Ok(0);
        }
        let embeddings = self.with_retries(|| self.provider.embed_batch(&missing))?;
        if embeddings.len() != missing.len() {
            return Err(EmbedError::BatchLength {
                expected: missing.len(),
                found: embeddings.len(),
            });
        }
        for (text, embedding) in missing.iter().zip(&embeddings) {
            self.check(text, embedding)?;
        }
        for (text, embedding) in missing.iter().zip(embeddings) {
            self.cache.insert_absent(text, embedding);
        }
        tracing::trace!(fetched = missing.len(), "prefetched embeddings");
        Ok(missing.len())
    }

    fn fetch(&self, text: &str) -> Result<Embedding, EmbedError> {
        let embedding = self.with_retries(|| self.provider.embed(text))?;
        self.check(text, &embedding)?;
        Ok(embedding)
    }

    fn with_retries<T>(&self, call: impl Fn() -> Result<T, EmbedError>) -> Result<T, EmbedError> {
        let mut retry = 0;
        loop {
            match call() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retry < self.config.max_retries => {
                    retry += 1;
                    let wait = self.config.backoff_for(retry);
                    tracing::warn!(
                        error = %e,
                        retry,
                        max_retries = self.config.max_retries,
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        "embedding call failed, retrying"
                    );
                    if !wait.is_zero() {
                        thread::sleep(wait);
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, retries = retry, "embedding call failed");
                    return Err(e);
                }
            }
        }
    }

    fn check(&self, text: &str, embedding: &Embedding) -> Result<(), EmbedError> {
        let expected = self.provider.dimension();
        if embedding.dimension() != expected {
            return Err(EmbedError::DimensionMismatch {
                expected,
                found: embedding.dimension(),
            });
        }
        if !embedding.is_finite() {
            return Err(EmbedError::NonFinite {
                text: text.to_string(),
            });
        }
        Ok(())
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbedder<P> {
    fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        self.get(text).map(|embedding| (*embedding).clone())
    }

    fn dimension(&self) -> usize {
        self.provider.dimension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails a fixed number of times before answering.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
        error: EmbedError,
    }

    impl Flaky {
        fn new(failures: u32, error: EmbedError) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                error,
            }
        }
    }

    impl EmbeddingProvider for Flaky {
        fn embed(&self, _text: &str) -> Result<Embedding, EmbedError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(self.error.clone())
            } else {
                Ok(Embedding::new(vec![1.0, 0.0]))
            }
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct Fixed(Vec<f32>);

    impl EmbeddingProvider for Fixed {
        fn embed(&self, _text: &str) -> Result<Embedding, EmbedError> {
            Ok(Embedding::new(self.0.clone()))
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn unavailable() -> EmbedError {
        EmbedError::Unavailable {
            reason: "busy".into(),
        }
    }

    #[test]
    fn retries_transient_failures() {
        let embedder = CachedEmbedder::with_config(
            Flaky::new(2, unavailable()),
            EmbeddingCache::shared(),
            EmbedConfig::no_retry().with_max_retries(2),
        );
        assert!(embedder.get("x").is_ok());
        assert_eq!(embedder.provider().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn gives_up_after_max_retries() {
        let embedder = CachedEmbedder::with_config(
            Flaky::new(5, unavailable()),
            EmbeddingCache::shared(),
            EmbedConfig::no_retry().with_max_retries(2),
        );
        assert_eq!(embedder.get("x").unwrap_err(), unavailable());
        assert_eq!(embedder.provider().calls.load(Ordering::SeqCst), 3);
        assert!(embedder.cache().is_empty());
    }

    #[test]
    fn permanent_failures_are_not_retried() {
        let error = EmbedError::NonFinite { text: "x".into() };
        let embedder = CachedEmbedder::with_config(
            Flaky::new(1, error.clone()),
            EmbeddingCache::shared(),
            EmbedConfig::no_retry().with_max_retries(5),
        );
        assert_eq!(embedder.get("x").unwrap_err(), error);
        assert_eq!(embedder.provider().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rejects_wrong_dimension() {
        let embedder = CachedEmbedder::new(Fixed(vec![1.0, 2.0, 3.0]), EmbeddingCache::shared());
        assert_eq!(
            embedder.get("x").unwrap_err(),
            EmbedError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn rejects_non_finite_components() {
        let embedder = CachedEmbedder::new(Fixed(vec![f32::NAN, 0.0]), EmbeddingCache::shared());
        assert!(matches!(
            embedder.get("x").unwrap_err(),
            EmbedError::NonFinite { .. }
        ));
    }

    /// Counts batch calls and answers with `dimension`-sized vectors.
    struct Batched {
        dimension: usize,
        batches: AtomicU32,
        short: bool,
    }

    impl Batched {
        fn new(dimension: usize) -> Self {
            Self {
                dimension,
                batches: AtomicU32::new(0),
                short: false,
            }
        }
    }

    impl EmbeddingProvider for Batched {
        fn embed(&self, _text: &str) -> Result<Embedding, EmbedError> {
            Ok(Embedding::new(vec![1.0; self.dimension]))
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedError> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            let count = if self.short { texts.len() - 1 } else { texts.len() };
            Ok((0..count).map(|_| Embedding::new(vec![1.0; self.dimension])).collect())
        }
    }

    #[test]
    fn prefetch_sends_one_batch_of_distinct_misses() {
        let cache = EmbeddingCache::shared();
        let embedder = CachedEmbedder::new(Batched::new(3), Arc::clone(&cache));
        embedder.get("intro").unwrap();

        let fetched = embedder.prefetch(&["intro", "methods", "results", "methods"]).unwrap();
        assert_eq!(fetched, 2);
        assert_eq!(embedder.provider().batches.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 3);

        assert_eq!(embedder.prefetch(&["methods", "results"]).unwrap(), 0);
        assert_eq!(embedder.provider().batches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prefetch_rejects_short_batches() {
        let provider = Batched {
            short: true,
            ..Batched::new(2)
        };
        let embedder = CachedEmbedder::new(provider, EmbeddingCache::shared());
        assert_eq!(
            embedder.prefetch(&["a", "b"]).unwrap_err(),
            EmbedError::BatchLength {
                expected: 2,
                found: 1
            }
        );
        assert!(embedder.cache().is_empty());
    }

    #[test]
    fn cached_vectors_of_another_dimension_are_rejected() {
        let cache = EmbeddingCache::shared();
        let narrow = CachedEmbedder::new(Fixed(vec![1.0, 0.0]), Arc::clone(&cache));
        let wide = CachedEmbedder::new(Batched::new(3), Arc::clone(&cache));
        narrow.get("x").unwrap();
        assert_eq!(
            wide.get("x").unwrap_err(),
            EmbedError::DimensionMismatch {
                expected: 3,
                found: 2
            }
        );
        // Already cached, so nothing is fetched; the lookup still fails.
        assert_eq!(wide.prefetch(&["x"]).unwrap(), 0);
        assert!(wide.get("x").is_err());
    }

    #[test]
    fn shares_cache_between_embedders() {
        let cache = EmbeddingCache::shared();
        let first = CachedEmbedder::new(Fixed(vec![1.0, 0.0]), Arc::clone(&cache));
        let second = CachedEmbedder::new(Fixed(vec![0.0, 1.0]), Arc::clone(&cache));
        first.get("x").unwrap();
        assert_eq!(second.get("x").unwrap().as_slice(), &[1.0, 0.0]);
        assert_eq!(cache.stats().hits, 1);
    }
}
