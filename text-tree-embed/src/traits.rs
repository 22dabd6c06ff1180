//! Embedding provider trait.

use std::sync::Arc;

use crate::{EmbedError, Embedding};

/// Turns text into fixed-length vectors.
///
/// Implementations may call a remote model, in which case `embed` blocks
/// for the duration of the call. Wrap providers in a
/// [`CachedEmbedder`](crate::CachedEmbedder) so identical texts are embedded
/// once per session.
///
/// # Contract
///
/// - Identical text yields an identical vector within a session.
/// - Every vector has exactly [`dimension`](Self::dimension) components.
/// - Failures are reported, never replaced by a zero vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds one text.
    ///
    /// # Errors
    ///
    /// Returns `EmbedError` if the provider fails or times out.
    fn embed(&self, text: &str) -> Result<Embedding, EmbedError>;

    /// Returns the dimension of every vector this provider produces.
    fn dimension(&self) -> usize;

    /// Embeds several texts, in order.
    ///
    /// The default implementation embeds one text at a time; remote
    /// providers should override it with a batched call.
    ///
    /// # Errors
    ///
    /// Returns the first `EmbedError` encountered.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for &P {
    fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        (**self).embed(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedError> {
        (**self).embed_batch(texts)
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<P> {
    fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        (**self).embed(text)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbedError> {
        (**self).embed_batch(texts)
    }
}
