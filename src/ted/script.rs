//! Edit scripts recovered from the distance tables.

use crate::tree::NodeId;

/// One step of a minimal-cost edit script.
///
/// Source-tree ids refer to the first tree, target-tree ids to the second.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EditOperation {
    /// Nodes with identical text aligned at zero cost.
    Match {
        /// Node in the source tree
        from: NodeId,
        /// Node in the target tree
        to: NodeId,
    },
    /// Nodes aligned with a text change.
    Relabel {
        /// Node in the source tree
        from: NodeId,
        /// Node in the target tree
        to: NodeId,
        /// Relabel cost
        cost: f64,
    },
    /// A target-tree node with no counterpart.
    Insert {
        /// Node in the target tree
        to: NodeId,
        /// Insert cost
        cost: f64,
    },
    /// A source-tree node with no counterpart.
    Delete {
        /// Node in the source tree
        from: NodeId,
        /// Delete cost
        cost: f64,
    },
}

impl EditOperation {
    /// Returns the cost contributed by this operation.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        match self {
            Self::Match { .. } => 0.0,
            Self::Relabel { cost, .. } | Self::Insert { cost, .. } | Self::Delete { cost, .. } => {
                *cost
            }
        }
    }

    /// Returns true for operations that keep a node pair aligned.
    #[must_use]
    pub const fn is_alignment(&self) -> bool {
        matches!(self, Self::Match { .. } | Self::Relabel { .. })
    }
}

/// A minimal-cost edit script together with the distance it realises.
///
/// Operations are listed in postorder of both trees: every operation on a
/// node comes after the operations on its descendants and its left siblings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment {
    operations: Vec<EditOperation>,
    distance: f64,
}

impl Alignment {
    pub(crate) fn new(operations: Vec<EditOperation>, distance: f64) -> Self {
        Self {
            operations,
            distance,
        }
    }

    /// Returns the ordered operations.
    #[must_use]
    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    /// Returns the tree edit distance this script realises.
    #[must_use]
    pub const fn distance(&self) -> f64 {
        self.distance
    }

    /// Sums the operation costs.
    ///
    /// Equal to [`distance`](Self::distance) up to floating-point summation
    /// order.
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.operations.iter().map(EditOperation::cost).sum()
    }

    /// Returns the aligned `(source, target)` node pairs.
    #[must_use]
    pub fn pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.operations
            .iter()
            .filter_map(|op| match op {
                EditOperation::Match { from, to } | EditOperation::Relabel { from, to, .. } => {
                    Some((*from, *to))
                }
                _ => None,
            })
            .collect()
    }

    /// Counts operations matching a predicate.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&EditOperation) -> bool) -> usize {
        self.operations.iter().filter(|op| predicate(op)).count()
    }
}
