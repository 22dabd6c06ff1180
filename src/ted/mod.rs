//! Generalized Zhang-Shasha ordered tree edit distance.
//!
//! The classical algorithm with unit costs replaced by a [`CostModel`]:
//!
//! 1. Number both trees in postorder and record, for every node, its
//!    leftmost leaf descendant `l(i)`.
//! 2. Keyroots are the highest nodes for each distinct `l(i)`.
//! 3. For every keyroot pair `(i, j)` fill the forest-distance table over the
//!    ranges `l(i)..=i` and `l(j)..=j`:
//!
//!    ```text
//!    fd[x][y] = min( fd[x-1][y] + delete(x),
//!                    fd[x][y-1] + insert(y),
//!                    fd[x-1][y-1] + relabel(x, y) )        when l(x)=l(i), l(y)=l(j)
//!    fd[x][y] = min( fd[x-1][y] + delete(x),
//!                    fd[x][y-1] + insert(y),
//!                    fd[l(x)-1][l(y)-1] + td[x][y] )       otherwise
//!    ```
//!
//!    and record `td[x][y]` for the first case.
//!
//! Time `O(|A|·|B|·min(depth, leaves)_A·min(depth, leaves)_B)`, space
//! `O(|A|·|B|)`. Ties prefer the aligning term, then delete, then insert.

mod buffer;
mod postorder;
mod script;

pub use script::{Alignment, EditOperation};

use buffer::ForestBuffer;
use postorder::PostorderIndex;

use crate::cost::{validate_cost, CostModel};
use crate::error::{CostOperation, DistanceError};
use crate::tree::TextTree;

/// Ordered tree edit distance engine parameterized by a cost model.
///
/// # Examples
///
/// ```
/// use text_tree::{TextTree, TreeEditDistance, UnitCost};
///
/// let a = TextTree::from_parts(
///     vec!["root".into(), "a".into(), "b".into(), "c".into()],
///     vec![vec![1, 2, 3], vec![], vec![], vec![]],
/// ).unwrap();
/// let b = TextTree::from_parts(
///     vec!["root".into(), "a".into(), "c".into()],
///     vec![vec![1, 2], vec![], vec![]],
/// ).unwrap();
///
/// let engine = TreeEditDistance::new(UnitCost);
/// assert!((engine.distance(&a, &b).unwrap() - 1.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone)]
pub struct TreeEditDistance<C> {
    cost: C,
}

impl<C: CostModel> TreeEditDistance<C> {
    /// Creates an engine using the given cost model.
    #[must_use]
    pub const fn new(cost: C) -> Self {
        Self { cost }
    }

    /// Returns the cost model.
    #[must_use]
    pub const fn cost_model(&self) -> &C {
        &self.cost
    }

    /// Computes the minimum total cost of transforming `a` into `b`.
    ///
    /// # Errors
    ///
    /// Returns `DistanceError::InvalidCost` if the cost model yields a
    /// negative or non-finite value, or `DistanceError::EmbeddingUnavailable`
    /// if it cannot compute a cost at all.
    pub fn distance(&self, a: &TextTree, b: &TextTree) -> Result<f64, DistanceError> {
        let solver = Solver::run(a, b, &self.cost)?;
        Ok(solver.distance())
    }

    /// Computes the distance together with a minimal-cost edit script.
    ///
    /// # Errors
    ///
    /// Same as [`distance`](Self::distance).
    pub fn align(&self, a: &TextTree, b: &TextTree) -> Result<Alignment, DistanceError> {
        let mut solver = Solver::run(a, b, &self.cost)?;
        Ok(solver.alignment())
    }
}

/// Convenience wrapper around [`TreeEditDistance::distance`].
///
/// # Errors
///
/// See [`TreeEditDistance::distance`].
pub fn tree_edit_distance<C: CostModel + ?Sized>(
    a: &TextTree,
    b: &TextTree,
    cost: &C,
) -> Result<f64, DistanceError> {
    TreeEditDistance::new(cost).distance(a, b)
}

/// Validated per-node and per-pair costs, indexed by postorder position.
struct CostTable {
    delete: Vec<f64>,
    insert: Vec<f64>,
    relabel: Vec<f64>,
    cols: usize,
}

impl CostTable {
    fn build<C: CostModel + ?Sized>(
        a: &TextTree,
        pa: &PostorderIndex,
        b: &TextTree,
        pb: &PostorderIndex,
        cost: &C,
    ) -> Result<Self, DistanceError> {
        let (n, m) = (pa.len(), pb.len());

        let texts: Vec<&str> = (1..=n)
            .map(|p| a.text(pa.node(p)))
            .chain((1..=m).map(|q| b.text(pb.node(q))))
            .collect();
        cost.prepare(&texts)?;

        let mut delete = vec![0.0; n + 1];
        for (p, slot) in delete.iter_mut().enumerate().skip(1) {
            let value = cost.delete(a.text(pa.node(p)))?;
            *slot = validate_cost(CostOperation::Delete, value)?;
        }

        let mut insert = vec![0.0; m + 1];
        for (q, slot) in insert.iter_mut().enumerate().skip(1) {
            let value = cost.insert(b.text(pb.node(q)))?;
            *slot = validate_cost(CostOperation::Insert, value)?;
        }

        let mut relabel = Vec::with_capacity(n * m);
        for p in 1..=n {
            let from = a.text(pa.node(p));
            for q in 1..=m {
                let value = cost.relabel(from, b.text(pb.node(q)))?;
                relabel.push(validate_cost(CostOperation::Relabel, value)?);
            }
        }

        Ok(Self {
            delete,
            insert,
            relabel,
            cols: m,
        })
    }

    #[inline]
    fn delete(&self, p: usize) -> f64 {
        self.delete[p]
    }

    #[inline]
    fn insert(&self, q: usize) -> f64 {
        self.insert[q]
    }

    #[inline]
    fn relabel(&self, p: usize, q: usize) -> f64 {
        self.relabel[(p - 1) * self.cols + (q - 1)]
    }
}

/// All state for one tree pair.
struct Solver<'t> {
    a: &'t TextTree,
    b: &'t TextTree,
    pa: PostorderIndex,
    pb: PostorderIndex,
    costs: CostTable,
    /// `tree_dist[p * (m + 1) + q]`: distance between subtrees `p` and `q`.
    tree_dist: Vec<f64>,
    forest: ForestBuffer,
}

impl<'t> Solver<'t> {
    fn run<C: CostModel + ?Sized>(
        a: &'t TextTree,
        b: &'t TextTree,
        cost: &C,
    ) -> Result<Self, DistanceError> {
        let pa = PostorderIndex::new(a);
        let pb = PostorderIndex::new(b);
        let (n, m) = (pa.len(), pb.len());
        tracing::trace!(
            nodes_a = n,
            nodes_b = m,
            keyroots_a = pa.keyroots().len(),
            keyroots_b = pb.keyroots().len(),
            "computing tree edit distance"
        );

        let costs = CostTable::build(a, &pa, b, &pb, cost)?;
        let mut solver = Self {
            a,
            b,
            pa,
            pb,
            costs,
            tree_dist: vec![0.0; (n + 1) * (m + 1)],
            forest: ForestBuffer::with_capacity(n + 1, m + 1),
        };

        if n > 0 && m > 0 {
            let keyroots_a = solver.pa.keyroots().to_vec();
            let keyroots_b = solver.pb.keyroots().to_vec();
            for &i in &keyroots_a {
                for &j in &keyroots_b {
                    solver.forest_distance(i, j);
                }
            }
        }

        Ok(solver)
    }

    fn distance(&self) -> f64 {
        let (n, m) = (self.pa.len(), self.pb.len());
        if n == 0 {
            return (1..=m).map(|q| self.costs.insert(q)).sum();
        }
        if m == 0 {
            return (1..=n).map(|p| self.costs.delete(p)).sum();
        }
        self.tree_dist(n, m)
    }

    #[inline]
    fn tree_dist(&self, p: usize, q: usize) -> f64 {
        self.tree_dist[p * (self.pb.len() + 1) + q]
    }

    /// Fills the forest table for the subtree pair `(i, j)`.
    fn forest_distance(&mut self, i: usize, j: usize) {
        let li = self.pa.leftmost(i);
        let lj = self.pb.leftmost(j);
        let rows = i - li + 2;
        let cols = j - lj + 2;
        let stride = self.pb.len() + 1;

        self.forest.reshape(rows, cols);
        self.forest.set(0, 0, 0.0);
        for x in 1..rows {
            let value = self.forest.get(x - 1, 0) + self.costs.delete(li + x - 1);
            self.forest.set(x, 0, value);
        }
        for y in 1..cols {
            let value = self.forest.get(0, y - 1) + self.costs.insert(lj + y - 1);
            self.forest.set(0, y, value);
        }

        for x in 1..rows {
            let p = li + x - 1;
            let lp = self.pa.leftmost(p);
            for y in 1..cols {
                let q = lj + y - 1;
                let lq = self.pb.leftmost(q);
                let delete = self.forest.get(x - 1, y) + self.costs.delete(p);
                let insert = self.forest.get(x, y - 1) + self.costs.insert(q);

                if lp == li && lq == lj {
                    let relabel = self.forest.get(x - 1, y - 1) + self.costs.relabel(p, q);
                    let best = cheapest(relabel, delete, insert);
                    self.forest.set(x, y, best);
                    self.tree_dist[p * stride + q] = best;
                } else {
                    let subtree = self.forest.get(lp - li, lq - lj) + self.tree_dist(p, q);
                    self.forest.set(x, y, cheapest(subtree, delete, insert));
                }
            }
        }
    }

    /// Recovers aligned postorder position pairs, ascending.
    ///
    /// Walks back through recomputed forest tables; every time the optimum
    /// went through a whole-subtree term the subtree pair is queued and
    /// solved the same way.
    // Candidates are recomputed with the exact expressions used to fill the
    // table, so bitwise comparison identifies the chosen term.
    #[allow(clippy::float_cmp)]
    fn mapping(&mut self) -> Vec<(usize, usize)> {
        let (n, m) = (self.pa.len(), self.pb.len());
        let mut pairs = Vec::new();
        if n == 0 || m == 0 {
            return pairs;
        }

        let mut pending = vec![(n, m)];
        while let Some((i, j)) = pending.pop() {
            self.forest_distance(i, j);
            let li = self.pa.leftmost(i);
            let lj = self.pb.leftmost(j);
            let (mut x, mut y) = (i - li + 1, j - lj + 1);

            while x > 0 && y > 0 {
                let p = li + x - 1;
                let q = lj + y - 1;
                let lp = self.pa.leftmost(p);
                let lq = self.pb.leftmost(q);
                let current = self.forest.get(x, y);
                let delete = self.forest.get(x - 1, y) + self.costs.delete(p);

                if lp == li && lq == lj {
                    let relabel = self.forest.get(x - 1, y - 1) + self.costs.relabel(p, q);
                    if relabel == current {
                        pairs.push((p, q));
                        x -= 1;
                        y -= 1;
                    } else if delete == current {
                        x -= 1;
                    } else {
                        y -= 1;
                    }
                } else {
                    let subtree = self.forest.get(lp - li, lq - lj) + self.tree_dist(p, q);
                    if subtree == current {
                        pending.push((p, q));
                        x = lp - li;
                        y = lq - lj;
                    } else if delete == current {
                        x -= 1;
                    } else {
                        y -= 1;
                    }
                }
            }
        }

        pairs.sort_unstable();
        pairs
    }

    /// Builds the postorder-ordered edit script.
    fn alignment(&mut self) -> Alignment {
        let pairs = self.mapping();
        let (n, m) = (self.pa.len(), self.pb.len());
        let mut operations = Vec::with_capacity(n + m);
        let (mut p, mut q) = (1, 1);

        for (mp, mq) in pairs {
            while p < mp {
                operations.push(self.delete_op(p));
                p += 1;
            }
            while q < mq {
                operations.push(self.insert_op(q));
                q += 1;
            }
            operations.push(self.align_op(mp, mq));
            p = mp + 1;
            q = mq + 1;
        }
        while p <= n {
            operations.push(self.delete_op(p));
            p += 1;
        }
        while q <= m {
            operations.push(self.insert_op(q));
            q += 1;
        }

        Alignment::new(operations, self.distance())
    }

    fn delete_op(&self, p: usize) -> EditOperation {
        EditOperation::Delete {
            from: self.pa.node(p),
            cost: self.costs.delete(p),
        }
    }

    fn insert_op(&self, q: usize) -> EditOperation {
        EditOperation::Insert {
            to: self.pb.node(q),
            cost: self.costs.insert(q),
        }
    }

    fn align_op(&self, p: usize, q: usize) -> EditOperation {
        let from = self.pa.node(p);
        let to = self.pb.node(q);
        let cost = self.costs.relabel(p, q);
        if cost == 0.0 && self.a.text(from) == self.b.text(to) {
            EditOperation::Match { from, to }
        } else {
            EditOperation::Relabel { from, to, cost }
        }
    }
}

/// Minimum of three candidates, preferring earlier ones on ties.
#[inline]
fn cheapest(preferred: f64, delete: f64, insert: f64) -> f64 {
    let mut best = preferred;
    if delete < best {
        best = delete;
    }
    if insert < best {
        best = insert;
    }
    best
}
