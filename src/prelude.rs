//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use text_tree::prelude::*;
//!
//! let tree = TextTree::leaf("root").unwrap();
//! let d = TreeEditDistance::new(UnitCost).distance(&tree, &tree).unwrap();
//! assert!(d.abs() < f64::EPSILON);
//! ```

pub use crate::{
    // Trees
    NodeId, Outline, TextTree, TreeBuilder,
    // Costs and distances
    distance, Alignment, CostModel, DistanceOptions, EditOperation, Measurement, Normalization,
    TreeDistance, TreeEditDistance, UnitCost,
    // Errors
    CostError, CostOperation, DistanceError, MalformedTree, MalformedTreeKind,
};
