//! Owned nested representation of a text tree.

use crate::error::MalformedTree;
use crate::tree::{NodeId, TextTree};

/// A text tree as nested records: a text and an ordered list of sub-outlines.
///
/// This is the form trees are usually exchanged in (parsed outlines, JSON
/// mind maps) and the form perturbations are applied to. Convert to a
/// [`TextTree`] with [`TextTree::from_outline`] before measuring distances.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(deny_unknown_fields))]
pub struct Outline {
    /// Node text.
    pub text: String,
    /// Ordered children.
    #[cfg_attr(feature = "serde", serde(default))]
    pub children: Vec<Outline>,
}

impl Outline {
    /// Creates an outline node with the given children.
    #[must_use]
    pub fn new(text: impl Into<String>, children: Vec<Outline>) -> Self {
        Self {
            text: text.into(),
            children,
        }
    }

    /// Creates a childless outline node.
    #[must_use]
    pub fn leaf(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }

    /// Appends a child and returns `self`.
    #[must_use]
    pub fn with_child(mut self, child: Outline) -> Self {
        self.children.push(child);
        self
    }

    /// Counts the nodes in this outline.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

impl TextTree {
    /// Converts a nested outline into a validated tree.
    ///
    /// Nodes are numbered in preorder, so the outline root becomes node 0.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTree` if any outline text is empty.
    pub fn from_outline(outline: &Outline) -> Result<Self, MalformedTree> {
        let mut texts = Vec::new();
        let mut children: Vec<Vec<usize>> = Vec::new();
        // (outline node, index of its parent in `texts`)
        let mut stack: Vec<(&Outline, Option<usize>)> = vec![(outline, None)];
        while let Some((node, parent)) = stack.pop() {
            let id = texts.len();
            texts.push(node.text.clone());
            children.push(Vec::new());
            if let Some(p) = parent {
                children[p].push(id);
            }
            stack.extend(node.children.iter().rev().map(|c| (c, Some(id))));
        }
        Self::from_parts(texts, children)
    }

    /// Converts the tree into a nested outline; `None` for the empty tree.
    #[must_use]
    pub fn to_outline(&self) -> Option<Outline> {
        let root = self.root()?;
        Some(self.subtree_outline(root))
    }

    /// Builds the outline rooted at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn subtree_outline(&self, id: NodeId) -> Outline {
        // Postorder guarantees children are finished before their parent.
        let mut built: Vec<Option<Outline>> = vec![None; self.len()];
        let mut stack = vec![(id, false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                let children = self
                    .children(node)
                    .iter()
                    .filter_map(|c| built[c.index()].take())
                    .collect();
                built[node.index()] = Some(Outline::new(self.text(node), children));
            } else {
                stack.push((node, true));
                stack.extend(self.children(node).iter().map(|&c| (c, false)));
            }
        }
        built[id.index()]
            .take()
            .unwrap_or_else(|| Outline::leaf(self.text(id)))
    }
}

impl TryFrom<&Outline> for TextTree {
    type Error = MalformedTree;

    fn try_from(outline: &Outline) -> Result<Self, Self::Error> {
        Self::from_outline(outline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedTreeKind;

    fn outline() -> Outline {
        Outline::new(
            "Paper",
            vec![
                Outline::new("Introduction", vec![Outline::leaf("Motivation")]),
                Outline::leaf("Methods"),
                Outline::leaf("Results"),
            ],
        )
    }

    #[test]
    fn from_outline_numbers_in_preorder() {
        let tree = TextTree::from_outline(&outline()).unwrap();
        assert_eq!(
            tree.texts().collect::<Vec<_>>(),
            vec!["Paper", "Introduction", "Motivation", "Methods", "Results"]
        );
        assert_eq!(tree.children(NodeId(0)).len(), 3);
    }

    #[test]
    fn outline_survives_conversion() {
        let original = outline();
        let tree = TextTree::from_outline(&original).unwrap();
        assert_eq!(tree.to_outline(), Some(original));
    }

    #[test]
    fn node_count_counts_all_levels() {
        assert_eq!(outline().node_count(), 5);
    }

    #[test]
    fn empty_text_is_rejected() {
        let bad = Outline::new("root", vec![Outline::leaf("")]);
        let err = TextTree::from_outline(&bad).unwrap_err();
        assert_eq!(err.kind, MalformedTreeKind::EmptyText { node: 1 });
    }

    #[test]
    fn subtree_outline_extracts_branch() {
        let tree = TextTree::from_outline(&outline()).unwrap();
        let branch = tree.subtree_outline(NodeId(1));
        assert_eq!(branch, Outline::new("Introduction", vec![Outline::leaf("Motivation")]));
    }
}
