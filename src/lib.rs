//! Ordered text trees and generalized tree edit distance.
//!
//! This crate compares hierarchical summaries (mind maps, outlines) whose
//! nodes carry short natural-language text. Distances are computed with the
//! Zhang-Shasha ordered tree edit distance algorithm, with the cost of every
//! relabel, insert and delete supplied by a pluggable [`CostModel`].
//!
//! # Overview
//!
//! ```text
//! TextTree pair → CostModel → TreeEditDistance → raw distance → Normalizer → score
//! ```
//!
//! - [`TextTree`]: validated, immutable ordered tree of text nodes.
//! - [`CostModel`]: relabel/insert/delete costs. [`UnitCost`] is the
//!   label-equality baseline; embedding-based models live in a companion
//!   crate.
//! - [`TreeEditDistance`]: the engine, returning a distance and optionally an
//!   [`Alignment`] (minimal-cost edit script).
//! - [`Normalization`]: bounded rescaling for cross-pair comparison.
//! - [`TreeDistance`]: the composed metric, with depth-limited (TTED@k),
//!   contextual and depth-averaged variants.
//! - [`rouge`]: a lexical pairwise baseline.
//!
//! # Quick Start
//!
//! ```rust
//! use text_tree::{distance, Outline, TextTree, UnitCost};
//!
//! let reference = TextTree::from_outline(
//!     &Outline::new("transformers", vec![
//!         Outline::leaf("attention"),
//!         Outline::leaf("positional encoding"),
//!     ]),
//! ).unwrap();
//! let candidate = TextTree::from_outline(
//!     &Outline::new("transformers", vec![Outline::leaf("attention")]),
//! ).unwrap();
//!
//! let m = distance(&reference, &candidate, &UnitCost).unwrap();
//! assert!((m.raw - 1.0).abs() < f64::EPSILON);
//! assert!(m.score > 0.0 && m.score <= 1.0);
//! assert_eq!(m.alignment.unwrap().operations().len(), 3);
//! ```
//!
//! # Cost Model Contract
//!
//! | Requirement | Checked by |
//! |-------------|------------|
//! | costs finite and `>= 0` | engine (`DistanceError::InvalidCost`) |
//! | `relabel(t, t) == 0` | implementor |
//! | `relabel(a, b) <= insert(b) + delete(a)` | implementor |
//!
//! # Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Outline`], [`NodeId`],
//!   [`EditOperation`], [`Alignment`] and [`Normalization`].

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod cost;
mod distance;
mod error;
#[cfg(kani)]
mod kani_impls;
mod normalize;
mod outline;
pub mod prelude;
pub mod rouge;
mod ted;
mod tree;

pub use cost::{validate_cost, CostModel, UnitCost};
pub use distance::{distance, DistanceOptions, Measurement, TreeDistance};
pub use error::{
    CostError, CostOperation, DistanceError, MalformedTree, MalformedTreeKind,
};
pub use normalize::{IndelBounds, Normalization, Normalizer};
pub use outline::Outline;
pub use ted::{tree_edit_distance, Alignment, EditOperation, TreeEditDistance};
pub use tree::{NodeId, TextTree, TreeBuilder};
