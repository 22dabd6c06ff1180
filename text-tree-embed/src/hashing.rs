//! Deterministic local embedding provider based on feature hashing.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::{EmbedError, Embedding, EmbeddingProvider};

/// Configuration for [`HashingEmbedder`].
#[derive(Debug, Clone, PartialEq)]
pub struct HashingConfig {
    /// Vector length.
    ///
    /// Default: 256
    pub dimension: usize,

    /// Also hash character n-grams of this length (with word boundary
    /// markers), which makes near-identical spellings close.
    ///
    /// Default: None
    pub char_ngram: Option<usize>,

    /// Weight of each character n-gram relative to a whole word.
    ///
    /// Default: 0.5
    pub ngram_weight: f32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            dimension: 256,
            char_ngram: None,
            ngram_weight: 0.5,
        }
    }
}

impl HashingConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the dimension (at least 1).
    #[must_use]
    pub const fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = if dimension == 0 { 1 } else { dimension };
        self
    }

    /// Enables character n-grams of length `n` (0 disables them).
    #[must_use]
    pub const fn with_char_ngram(mut self, n: usize) -> Self {
        self.char_ngram = if n == 0 { None } else { Some(n) };
        self
    }

    /// Sets the n-gram weight.
    #[must_use]
    pub const fn with_ngram_weight(mut self, weight: f32) -> Self {
        self.ngram_weight = weight;
        self
    }
}

/// Bag-of-words embedder using signed feature hashing.
///
/// Text is lowercased and split into alphanumeric words. Each word is first
/// mapped through an alias table (synonym → canonical word), then hashed with
/// SHA-256 into one of `dimension` buckets with a hash-derived sign. Texts
/// without words embed to the zero vector.
///
/// Aliases make the embedder treat known paraphrases as identical, which
/// makes it a reproducible stand-in for a language model in tests and
/// offline evaluation.
///
/// # Examples
///
/// ```
/// use text_tree_embed::{cosine_distance, EmbeddingProvider, HashingEmbedder};
///
/// let embedder = HashingEmbedder::default().with_alias("findings", "results");
/// let a = embedder.embed("Main results").unwrap();
/// let b = embedder.embed("main findings").unwrap();
/// assert!(cosine_distance(&a, &b).unwrap() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HashingEmbedder {
    config: HashingConfig,
    aliases: HashMap<String, String>,
}

impl HashingEmbedder {
    /// Creates an embedder with the given configuration and no aliases.
    ///
    /// A zero `dimension` is raised to 1.
    #[must_use]
    pub fn new(mut config: HashingConfig) -> Self {
        config.dimension = config.dimension.max(1);
        Self {
            config,
            aliases: HashMap::new(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &HashingConfig {
        &self.config
    }

    /// Maps the word `alias` to `canonical` before hashing.
    #[must_use]
    pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.aliases
            .insert(alias.to_lowercase(), canonical.to_lowercase());
        self
    }

    /// Adds several aliases.
    #[must_use]
    pub fn with_aliases<'a, I>(self, aliases: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        aliases
            .into_iter()
            .fold(self, |embedder, (alias, canonical)| {
                embedder.with_alias(alias, canonical)
            })
    }

    /// Returns the canonical form of a lowercased word.
    fn canonical<'w>(&'w self, word: &'w str) -> &'w str {
        self.aliases.get(word).map_or(word, String::as_str)
    }
}

/// Adds `weight` with a hash-derived sign to the bucket of `feature`.
fn add_feature(values: &mut [f32], feature: &[u8], weight: f32) {
    let digest = Sha256::digest(feature);
    let mut bucket = [0u8; 8];
    bucket.copy_from_slice(&digest[..8]);
    let dimension = values.len() as u64;
    // The remainder is below `values.len()`.
    #[allow(clippy::cast_possible_truncation)]
    let index = (u64::from_le_bytes(bucket) % dimension) as usize;
    let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
    values[index] += sign * weight;
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding, EmbedError> {
        let mut values = vec![0.0f32; self.config.dimension];
        let lowered = text.to_lowercase();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = self.canonical(word);
            let mut feature = Vec::with_capacity(word.len() + 2);
            feature.extend_from_slice(b"w:");
            feature.extend_from_slice(word.as_bytes());
            add_feature(&mut values, &feature, 1.0);

            if let Some(n) = self.config.char_ngram {
                let padded: Vec<char> = std::iter::once('<')
                    .chain(word.chars())
                    .chain(std::iter::once('>'))
                    .collect();
                for gram in padded.windows(n) {
                    let gram: String = gram.iter().collect();
                    let feature = format!("c:{gram}");
                    add_feature(&mut values, feature.as_bytes(), self.config.ngram_weight);
                }
            }
        }
        Ok(Embedding::new(values))
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}
