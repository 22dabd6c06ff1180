//! Postorder numbering, leftmost-leaf descendants and keyroots.

use crate::tree::{NodeId, TextTree};

/// Zhang-Shasha view of one tree.
///
/// Positions are 1-based postorder numbers; position 0 stands for "no node"
/// so that forest ranges `l(i)-1 ..= i` can be indexed without offsets.
#[derive(Debug, Clone)]
pub(crate) struct PostorderIndex {
    /// `nodes[p - 1]` is the node at postorder position `p`.
    nodes: Vec<NodeId>,
    /// `leftmost[p]` is the position of the leftmost leaf below `p`.
    leftmost: Vec<usize>,
    /// Ascending keyroot positions.
    keyroots: Vec<usize>,
}

impl PostorderIndex {
    pub(crate) fn new(tree: &TextTree) -> Self {
        let nodes = tree.postorder();
        let n = nodes.len();

        let mut position = vec![0usize; n];
        let mut leftmost = vec![0usize; n + 1];
        for (offset, &id) in nodes.iter().enumerate() {
            let p = offset + 1;
            position[id.index()] = p;
            leftmost[p] = match tree.children(id).first() {
                Some(first) => leftmost[position[first.index()]],
                None => p,
            };
        }

        // A keyroot is the highest node sharing its leftmost leaf.
        let mut seen = vec![false; n + 1];
        let mut keyroots = Vec::new();
        for p in (1..=n).rev() {
            let l = leftmost[p];
            if !seen[l] {
                seen[l] = true;
                keyroots.push(p);
            }
        }
        keyroots.reverse();

        Self {
            nodes,
            leftmost,
            keyroots,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, position: usize) -> NodeId {
        self.nodes[position - 1]
    }

    pub(crate) fn leftmost(&self, position: usize) -> usize {
        self.leftmost[position]
    }

    pub(crate) fn keyroots(&self) -> &[usize] {
        &self.keyroots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// f(d(a, c(b)), e), the textbook Zhang-Shasha example.
    fn textbook() -> TextTree {
        TextTree::from_parts(
            vec!["f", "d", "a", "c", "b", "e"]
                .into_iter()
                .map(String::from)
                .collect(),
            vec![vec![1, 5], vec![2, 3], vec![], vec![4], vec![], vec![]],
        )
        .unwrap()
    }

    #[test]
    fn postorder_positions() {
        let tree = textbook();
        let index = PostorderIndex::new(&tree);
        let labels: Vec<_> = (1..=index.len()).map(|p| tree.text(index.node(p))).collect();
        assert_eq!(labels, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn leftmost_leaves() {
        let index = PostorderIndex::new(&textbook());
        let leftmost: Vec<_> = (1..=6).map(|p| index.leftmost(p)).collect();
        assert_eq!(leftmost, vec![1, 2, 2, 1, 5, 1]);
    }

    #[test]
    fn keyroots_are_highest_per_leftmost_leaf() {
        let index = PostorderIndex::new(&textbook());
        assert_eq!(index.keyroots(), &[3, 5, 6]);
    }

    #[test]
    fn empty_tree_has_no_keyroots() {
        let index = PostorderIndex::new(&TextTree::empty());
        assert_eq!(index.len(), 0);
        assert!(index.keyroots().is_empty());
    }
}
