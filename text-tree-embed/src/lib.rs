//! Embedding providers and semantic cost models for text-tree distances.
//!
//! This crate supplies the semantic half of the text-tree metric:
//!
//! - **Provider interface**: [`EmbeddingProvider`] turns text into vectors
//! - **Vectors**: [`Embedding`] and the fixed [`cosine_distance`] convention
//! - **Session cache**: [`EmbeddingCache`], shared across threads and metrics
//! - **Resilience**: [`CachedEmbedder`] with bounded retries ([`EmbedConfig`])
//!   and output validation
//! - **Local provider**: [`HashingEmbedder`], deterministic feature hashing
//!   with synonym aliases
//! - **Cost model**: [`SemanticCostModel`] implementing
//!   [`text_tree::CostModel`]
//!
//! # Overview
//!
//! ```text
//! relabel(a, b) = min(clamp(1 - cos(embed(a), embed(b)), 0, 1), insert(b) + delete(a))
//! ```
//!
//! Identical texts cost 0 without an embedding call. Insert and delete costs
//! come from [`IndelCost`]; the default constant 1 keeps semantic and
//! unit-cost distances on the same scale.
//!
//! # Quick Start
//!
//! ```rust
//! use text_tree::{Outline, TextTree, TreeDistance};
//! use text_tree_embed::{
//!     CachedEmbedder, EmbeddingCache, HashingEmbedder, SemanticCostModel,
//! };
//!
//! // One cache per evaluation session
//! let cache = EmbeddingCache::shared();
//! let provider = HashingEmbedder::default()
//!     .with_aliases([("intro", "introduction"), ("findings", "results")]);
//! let cost = SemanticCostModel::new(CachedEmbedder::new(provider, cache.clone()));
//! let metric = TreeDistance::new(cost);
//!
//! let reference = TextTree::from_outline(&Outline::new(
//!     "paper",
//!     vec![Outline::leaf("introduction"), Outline::leaf("results")],
//! )).unwrap();
//! let paraphrase = TextTree::from_outline(&Outline::new(
//!     "paper",
//!     vec![Outline::leaf("intro"), Outline::leaf("findings")],
//! )).unwrap();
//!
//! assert!(metric.score(&reference, &paraphrase).unwrap() < 1e-9);
//! assert!(cache.len() >= 4);
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod cache;
mod cached;
mod config;
mod cost;
mod embedding;
mod error;
mod hashing;
mod stats;
mod traits;

pub use cache::EmbeddingCache;
pub use cached::CachedEmbedder;
pub use config::EmbedConfig;
pub use cost::{IndelCost, SemanticCostModel};
pub use embedding::{cosine_distance, Embedding};
pub use error::EmbedError;
pub use hashing::{HashingConfig, HashingEmbedder};
pub use stats::CacheStats;
pub use traits::EmbeddingProvider;
