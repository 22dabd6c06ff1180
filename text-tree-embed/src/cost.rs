//! Embedding-based cost model.

use std::sync::Arc;

use text_tree::{CostError, CostModel};

use crate::{
    cosine_distance, CachedEmbedder, EmbedConfig, Embedding, EmbeddingCache, EmbeddingProvider,
};

/// How [`SemanticCostModel`] prices inserting or deleting a node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IndelCost {
    /// Every node costs the same. `Constant(1.0)` matches the unit-cost
    /// baseline, so raw distances of both models share a scale.
    Constant(f64),
    /// Cosine distance between the node's embedding and the embedding of the
    /// empty string: texts that carry more meaning cost more to add or drop.
    EmptyTextDistance,
}

impl Default for IndelCost {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}

/// Relabel cost from semantic distance, insert/delete cost from
/// [`IndelCost`].
///
/// # Cost convention
///
/// - `relabel(a, b) = min(cosine_distance(embed(a), embed(b)), insert(b) + delete(a))`,
///   with identical text short-circuiting to 0 without an embedding call.
/// - Cosine distance follows [`cosine_distance`]: `clamp(1 - cos, 0, 1)`.
///
/// Insert and delete costs depend only on the node's own text, never on its
/// subtree.
///
/// Embedding failures surface as `CostError::EmbeddingUnavailable`; no
/// default vector is ever substituted.
///
/// # Examples
///
/// ```
/// use text_tree::{CostModel, TextTree, TreeEditDistance};
/// use text_tree_embed::{HashingEmbedder, SemanticCostModel};
///
/// let embedder = HashingEmbedder::default().with_alias("findings", "results");
/// let cost = SemanticCostModel::from_provider(embedder);
///
/// assert!(cost.relabel("key results", "key findings").unwrap() < 1e-9);
///
/// let a = TextTree::leaf("key results").unwrap();
/// let b = TextTree::leaf("key findings").unwrap();
/// assert!(TreeEditDistance::new(&cost).distance(&a, &b).unwrap() < 1e-9);
/// ```
#[derive(Debug)]
pub struct SemanticCostModel<P> {
    embedder: CachedEmbedder<P>,
    indel: IndelCost,
}

impl<P: EmbeddingProvider> SemanticCostModel<P> {
    /// Creates a model over an existing cached embedder.
    #[must_use]
    pub fn new(embedder: CachedEmbedder<P>) -> Self {
        Self {
            embedder,
            indel: IndelCost::default(),
        }
    }

    /// Creates a model with a fresh private cache and default retries.
    #[must_use]
    pub fn from_provider(provider: P) -> Self {
        Self::new(CachedEmbedder::with_config(
            provider,
            Arc::new(EmbeddingCache::new()),
            EmbedConfig::default(),
        ))
    }

    /// Sets the insert/delete policy.
    #[must_use]
    pub const fn with_indel(mut self, indel: IndelCost) -> Self {
        self.indel = indel;
        self
    }

    /// Returns the insert/delete policy.
    #[must_use]
    pub const fn indel(&self) -> IndelCost {
        self.indel
    }

    /// Returns the cached embedder.
    #[must_use]
    pub const fn embedder(&self) -> &CachedEmbedder<P> {
        &self.embedder
    }

    /// Semantic distance between two texts, uncapped.
    ///
    /// # Errors
    ///
    /// Returns `CostError::EmbeddingUnavailable` naming the text that failed.
    pub fn semantic_distance(&self, a: &str, b: &str) -> Result<f64, CostError> {
        if a == b {
            return Ok(0.0);
        }
        let ea = self.embed(a)?;
        let eb = self.embed(b)?;
        cosine_distance(&ea, &eb).map_err(|e| e.into_cost_error(b))
    }

    fn embed(&self, text: &str) -> Result<Arc<Embedding>, CostError> {
        self.embedder.get(text).map_err(|e| e.into_cost_error(text))
    }

    fn indel_cost(&self, text: &str) -> Result<f64, CostError> {
        match self.indel {
            IndelCost::Constant(cost) => Ok(cost),
            IndelCost::EmptyTextDistance => self.semantic_distance(text, ""),
        }
    }
}

impl<P: EmbeddingProvider> CostModel for SemanticCostModel<P> {
    fn relabel(&self, from: &str, to: &str) -> Result<f64, CostError> {
        if from == to {
            return Ok(0.0);
        }
        let distance = self.semantic_distance(from, to)?;
        let ceiling = self.indel_cost(to)? + self.indel_cost(from)?;
        Ok(distance.min(ceiling))
    }

    fn insert(&self, text: &str) -> Result<f64, CostError> {
        self.indel_cost(text)
    }

    fn delete(&self, text: &str) -> Result<f64, CostError> {
        self.indel_cost(text)
    }

    /// Embeds all uncached node texts in one batch. A failed batch is
    /// reported against its first text.
    fn prepare(&self, texts: &[&str]) -> Result<(), CostError> {
        self.embedder
            .prefetch(texts)
            .map(drop)
            .map_err(|e| e.into_cost_error(texts.first().copied().unwrap_or_default()))
    }
}
