//! The ordered text tree.

use std::fmt;

use crate::error::{MalformedTree, MalformedTreeKind};

/// Identifier of a node within one [`TextTree`].
///
/// Identifiers are stable for the lifetime of the tree instance they came
/// from. They carry no meaning across trees, and derived trees (such as
/// [`TextTree::truncated`]) number their nodes afresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the raw index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
}

/// An ordered, rooted tree whose nodes carry natural-language text.
///
/// Child order is significant and never changes after construction. The
/// empty tree (no nodes at all) is a valid value; otherwise the root is
/// always [`NodeId`] 0.
///
/// # Examples
///
/// ```
/// use text_tree::TextTree;
///
/// let tree = TextTree::from_parts(
///     vec!["Paper".into(), "Introduction".into(), "Methods".into()],
///     vec![vec![1, 2], vec![], vec![]],
/// ).unwrap();
///
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.max_depth(), 1);
/// let root = tree.root().unwrap();
/// assert_eq!(tree.text(root), "Paper");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextTree {
    nodes: Vec<Node>,
}

impl TextTree {
    /// Returns the empty tree.
    #[must_use]
    pub const fn empty() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Creates a single-node tree.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTree` if `text` is empty.
    pub fn leaf(text: impl Into<String>) -> Result<Self, MalformedTree> {
        Self::from_parts(vec![text.into()], vec![Vec::new()])
    }

    /// Builds a tree from a node-text list and an adjacency (child index) list.
    ///
    /// Node 0 is the root. `children[i]` lists the children of node `i` in
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTree` if the lists differ in length, a text is
    /// empty, a child index is out of range, a node is referenced twice,
    /// the root has a parent, or some node is unreachable from the root
    /// (cycle or detached node).
    pub fn from_parts(texts: Vec<String>, children: Vec<Vec<usize>>) -> Result<Self, MalformedTree> {
        if texts.len() != children.len() {
            return Err(MalformedTree::new(MalformedTreeKind::LengthMismatch {
                texts: texts.len(),
                children: children.len(),
            }));
        }
        let len = texts.len();
        if len == 0 {
            return Ok(Self::empty());
        }

        if let Some(node) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(MalformedTree::new(MalformedTreeKind::EmptyText { node }));
        }

        let mut parent: Vec<Option<usize>> = vec![None; len];
        for (p, kids) in children.iter().enumerate() {
            for &c in kids {
                if c >= len {
                    return Err(MalformedTree::new(MalformedTreeKind::ChildOutOfRange {
                        parent: p,
                        child: c,
                        len,
                    }));
                }
                if c == p {
                    return Err(MalformedTree::new(MalformedTreeKind::SelfLoop { node: p }));
                }
                if c == 0 {
                    return Err(MalformedTree::new(MalformedTreeKind::RootHasParent {
                        parent: p,
                    }));
                }
                if parent[c].is_some() {
                    return Err(MalformedTree::new(MalformedTreeKind::DuplicateReference {
                        node: c,
                    }));
                }
                parent[c] = Some(p);
            }
        }

        // Breadth-first from the root assigns depths and marks reachability.
        let mut depth: Vec<Option<usize>> = vec![None; len];
        depth[0] = Some(0);
        let mut queue = std::collections::VecDeque::from([0usize]);
        while let Some(v) = queue.pop_front() {
            let d = depth[v].unwrap_or_default();
            for &c in &children[v] {
                depth[c] = Some(d + 1);
                queue.push_back(c);
            }
        }

        if let Some(unreached) = depth.iter().position(Option::is_none) {
            return Err(MalformedTree::new(classify_unreachable(unreached, &parent)));
        }

        let nodes = texts
            .into_iter()
            .zip(children)
            .enumerate()
            .map(|(i, (text, kids))| Node {
                text,
                parent: parent[i].map(NodeId),
                children: kids.into_iter().map(NodeId).collect(),
                depth: depth[i].unwrap_or_default(),
            })
            .collect();

        Ok(Self { nodes })
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true for the empty tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the root, or `None` for the empty tree.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    /// Returns the text of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id.0].text
    }

    /// Returns the ordered children of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Returns the parent of a node (`None` for the root).
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Returns the depth of a node; the root has depth 0.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.nodes[id.0].depth
    }

    /// Returns the greatest node depth (0 for single-node and empty trees).
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Returns true if `id` belongs to this tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Iterates over all node ids in index order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Iterates over node texts in index order.
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.iter().map(|n| n.text.as_str())
    }

    /// Returns node ids in preorder (parent before children, left to right).
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root() else {
            return order;
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Returns node ids in postorder (children left to right, then parent).
    #[must_use]
    pub fn postorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root() else {
            return order;
        };
        // (node, index of next child to visit)
        let mut stack = vec![(root, 0usize)];
        while let Some((id, next)) = stack.pop() {
            let kids = self.children(id);
            if next < kids.len() {
                stack.push((id, next + 1));
                stack.push((kids[next], 0));
            } else {
                order.push(id);
            }
        }
        order
    }

    /// Returns a new tree keeping only nodes at depth `<= max_depth`.
    ///
    /// This is the trimming used for depth-limited distances (TTED@k).
    #[must_use]
    pub fn truncated(&self, max_depth: usize) -> Self {
        self.derive(|tree, id, _| {
            (tree.depth(id) <= max_depth).then(|| tree.text(id).to_string())
        })
    }

    /// Returns a new tree in which every node's text is prefixed with the
    /// (already contextualised) text of its parent, joined by `separator`.
    ///
    /// The root keeps its own text. Structure is unchanged.
    #[must_use]
    pub fn with_context(&self, separator: &str) -> Self {
        self.derive(|tree, id, parent_text| {
            Some(match parent_text {
                Some(context) => format!("{context}{separator}{}", tree.text(id)),
                None => tree.text(id).to_string(),
            })
        })
    }

    /// Rebuilds the tree top-down.
    ///
    /// `relabel` receives each node and the new text of its parent; it
    /// returns the node's new text, or `None` to drop the node together with
    /// its whole subtree.
    fn derive<F>(&self, mut relabel: F) -> Self
    where
        F: FnMut(&Self, NodeId, Option<&str>) -> Option<String>,
    {
        let mut nodes: Vec<Node> = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root() else {
            return Self::empty();
        };
        let Some(root_text) = relabel(self, root, None) else {
            return Self::empty();
        };
        nodes.push(Node {
            text: root_text,
            parent: None,
            children: Vec::new(),
            depth: 0,
        });

        // (old id, new id)
        let mut stack = vec![(root, NodeId(0))];
        while let Some((old, new)) = stack.pop() {
            let mut kept = Vec::new();
            for &child in self.children(old) {
                let parent_text = nodes[new.0].text.clone();
                if let Some(text) = relabel(self, child, Some(&parent_text)) {
                    let id = NodeId(nodes.len());
                    nodes.push(Node {
                        text,
                        parent: Some(new),
                        children: Vec::new(),
                        depth: nodes[new.0].depth + 1,
                    });
                    kept.push((child, id));
                }
            }
            nodes[new.0].children = kept.iter().map(|&(_, id)| id).collect();
            stack.extend(kept.into_iter().rev());
        }

        Self { nodes }
    }
}

/// Works out why `node` cannot be reached from the root.
fn classify_unreachable(node: usize, parent: &[Option<usize>]) -> MalformedTreeKind {
    let mut current = node;
    for _ in 0..=parent.len() {
        match parent[current] {
            None => return MalformedTreeKind::Detached { node: current },
            Some(p) => current = p,
        }
    }
    MalformedTreeKind::Cycle { node: current }
}

impl fmt::Display for TextTree {
    /// Writes one line per node in preorder, indented with one `-` per level.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.preorder() {
            writeln!(f, "{}{}", "-".repeat(self.depth(id)), self.text(id))?;
        }
        Ok(())
    }
}

/// Incremental construction of a [`TextTree`].
///
/// ```
/// use text_tree::TreeBuilder;
///
/// let mut builder = TreeBuilder::new("Paper");
/// let intro = builder.add_child(builder.root(), "Introduction");
/// builder.add_child(intro, "Motivation");
/// builder.add_child(builder.root(), "Results");
/// let tree = builder.build().unwrap();
///
/// assert_eq!(tree.len(), 4);
/// assert_eq!(tree.max_depth(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    texts: Vec<String>,
    children: Vec<Vec<usize>>,
    dangling: Option<usize>,
}

impl TreeBuilder {
    /// Starts a tree with the given root text.
    #[must_use]
    pub fn new(root_text: impl Into<String>) -> Self {
        Self {
            texts: vec![root_text.into()],
            children: vec![Vec::new()],
            dangling: None,
        }
    }

    /// Returns the root id.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Appends a child as the last child of `parent` and returns its id.
    ///
    /// An unknown `parent` is reported by [`build`](Self::build) as a
    /// detached node.
    pub fn add_child(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        let id = self.texts.len();
        self.texts.push(text.into());
        self.children.push(Vec::new());
        match self.children.get_mut(parent.0) {
            Some(kids) if parent.0 != id => kids.push(id),
            _ => {
                self.dangling.get_or_insert(id);
            }
        }
        NodeId(id)
    }

    /// Validates and returns the tree.
    ///
    /// # Errors
    ///
    /// Returns `MalformedTree` if a text is empty or a child was attached to
    /// an unknown parent.
    pub fn build(self) -> Result<TextTree, MalformedTree> {
        if let Some(node) = self.dangling {
            return Err(MalformedTree::new(MalformedTreeKind::Detached { node }));
        }
        TextTree::from_parts(self.texts, self.children)
    }
}
