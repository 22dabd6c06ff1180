//! Error types for tree construction and distance computation.

use std::fmt;

/// A text tree violated a structural invariant.
///
/// Raised at construction time, so every [`TextTree`](crate::TextTree) that
/// reaches the distance engine is known to be well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTree {
    /// The specific invariant that was violated
    pub kind: MalformedTreeKind,
}

impl MalformedTree {
    /// Creates a new error of the given kind.
    #[must_use]
    pub const fn new(kind: MalformedTreeKind) -> Self {
        Self { kind }
    }
}

/// Specific structural violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedTreeKind {
    /// The text list and the child-list list have different lengths
    LengthMismatch {
        /// Number of node texts
        texts: usize,
        /// Number of child lists
        children: usize,
    },
    /// A node has empty (or whitespace-only) text
    EmptyText {
        /// Index of the offending node
        node: usize,
    },
    /// A child index points past the end of the node list
    ChildOutOfRange {
        /// Parent node index
        parent: usize,
        /// The out-of-range child index
        child: usize,
        /// Number of nodes in the tree
        len: usize,
    },
    /// A node lists itself as a child
    SelfLoop {
        /// Index of the offending node
        node: usize,
    },
    /// A node is referenced as a child more than once
    DuplicateReference {
        /// Index of the node with more than one parent reference
        node: usize,
    },
    /// The root (node 0) is listed as somebody's child
    RootHasParent {
        /// The node claiming the root as a child
        parent: usize,
    },
    /// Following parent links from this node never reaches a root
    Cycle {
        /// A node on the cycle
        node: usize,
    },
    /// This node has no parent and is not the root
    Detached {
        /// Index of the detached node
        node: usize,
    },
}

impl fmt::Display for MalformedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed tree: ")?;
        match &self.kind {
            MalformedTreeKind::LengthMismatch { texts, children } => write!(
                f,
                "{texts} node texts but {children} child lists; every node needs exactly one child list"
            ),
            MalformedTreeKind::EmptyText { node } => {
                write!(f, "node {node} has empty text")
            }
            MalformedTreeKind::ChildOutOfRange { parent, child, len } => write!(
                f,
                "node {parent} lists child {child} but the tree only has {len} nodes"
            ),
            MalformedTreeKind::SelfLoop { node } => {
                write!(f, "node {node} lists itself as a child")
            }
            MalformedTreeKind::DuplicateReference { node } => {
                write!(f, "node {node} is referenced as a child more than once")
            }
            MalformedTreeKind::RootHasParent { parent } => {
                write!(f, "root node 0 is listed as a child of node {parent}")
            }
            MalformedTreeKind::Cycle { node } => {
                write!(f, "node {node} is part of a parent cycle")
            }
            MalformedTreeKind::Detached { node } => {
                write!(f, "node {node} is not reachable from the root")
            }
        }
    }
}

impl std::error::Error for MalformedTree {}

/// The kind of edit operation a cost was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CostOperation {
    /// Replace one node's text with another's
    Relabel,
    /// Insert a node of the target tree
    Insert,
    /// Delete a node of the source tree
    Delete,
}

impl fmt::Display for CostOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relabel => write!(f, "relabel"),
            Self::Insert => write!(f, "insert"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Errors a [`CostModel`](crate::CostModel) may report.
#[derive(Debug, Clone, PartialEq)]
pub enum CostError {
    /// The cost model produced a value outside `[0, inf)`
    InvalidCost {
        /// Operation the cost was computed for
        operation: CostOperation,
        /// The offending value
        value: f64,
    },
    /// The embedding provider behind the cost model could not embed a text
    EmbeddingUnavailable {
        /// The text that failed to embed
        text: String,
        /// Provider-reported reason
        reason: String,
    },
}

impl fmt::Display for CostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCost { operation, value } => write!(
                f,
                "{operation} cost {value} is invalid; costs must be finite and non-negative"
            ),
            Self::EmbeddingUnavailable { text, reason } => {
                write!(f, "embedding unavailable for '{text}': {reason}")
            }
        }
    }
}

impl std::error::Error for CostError {}

/// Errors surfaced by a tree-pair distance computation.
///
/// Any failure aborts that single computation; nothing is swallowed.
#[derive(Debug, Clone, PartialEq)]
pub enum DistanceError {
    /// An input tree violated a structural invariant
    MalformedTree(MalformedTree),
    /// The cost model returned a negative or non-finite cost
    InvalidCost {
        /// Operation the cost was computed for
        operation: CostOperation,
        /// The offending value
        value: f64,
    },
    /// The embedding provider failed
    EmbeddingUnavailable {
        /// The text that failed to embed
        text: String,
        /// Provider-reported reason
        reason: String,
    },
}

impl DistanceError {
    /// Short stable label for the error kind, used for exclusion tallies.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::MalformedTree(_) => "malformed_tree",
            Self::InvalidCost { .. } => "invalid_cost",
            Self::EmbeddingUnavailable { .. } => "embedding_unavailable",
        }
    }
}

impl fmt::Display for DistanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedTree(e) => write!(f, "{e}"),
            Self::InvalidCost { operation, value } => write!(
                f,
                "invalid {operation} cost {value}; costs must be finite and non-negative"
            ),
            Self::EmbeddingUnavailable { text, reason } => {
                write!(f, "embedding unavailable for '{text}': {reason}")
            }
        }
    }
}

impl std::error::Error for DistanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedTree(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MalformedTree> for DistanceError {
    fn from(e: MalformedTree) -> Self {
        Self::MalformedTree(e)
    }
}

impl From<CostError> for DistanceError {
    fn from(e: CostError) -> Self {
        match e {
            CostError::InvalidCost { operation, value } => Self::InvalidCost { operation, value },
            CostError::EmbeddingUnavailable { text, reason } => {
                Self::EmbeddingUnavailable { text, reason }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display_names_node() {
        let err = MalformedTree::new(MalformedTreeKind::Cycle { node: 3 });
        assert!(err.to_string().contains("node 3"));
    }

    #[test]
    fn cost_error_converts_to_distance_error() {
        let err: DistanceError = CostError::InvalidCost {
            operation: CostOperation::Insert,
            value: -1.0,
        }
        .into();
        assert_eq!(err.kind_label(), "invalid_cost");

        let err: DistanceError = CostError::EmbeddingUnavailable {
            text: "Intro".to_string(),
            reason: "timeout".to_string(),
        }
        .into();
        assert_eq!(err.kind_label(), "embedding_unavailable");
        assert!(err.to_string().contains("Intro"));
    }
}
