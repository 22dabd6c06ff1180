//! Seeded generation of perturbed tree variants.

use std::collections::BTreeMap;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use text_tree::{MalformedTree, TextTree};

use crate::error::PerturbationError;
use crate::perturbation::{ContentSource, PerturbationClass, PerturbationRecord};
use crate::stats::Aggregate;

/// Configuration for perturbation corpus generation and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerturbationConfig {
    /// Variants generated per reference tree and class.
    ///
    /// Default: 6
    pub samples_per_class: usize,

    /// Largest number of elementary edits per variant. Requested magnitudes
    /// cycle through `1..=max_magnitude`, identically for every class.
    ///
    /// Default: 3
    pub max_magnitude: usize,

    /// How responses and ratios are summarised.
    ///
    /// Default: `Aggregate::Mean`
    pub aggregate: Aggregate,
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            samples_per_class: 6,
            max_magnitude: 3,
            aggregate: Aggregate::Mean,
        }
    }
}

impl PerturbationConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of variants per reference and class.
    #[must_use]
    pub const fn with_samples_per_class(mut self, samples: usize) -> Self {
        self.samples_per_class = samples;
        self
    }

    /// Sets the largest magnitude (at least 1).
    #[must_use]
    pub const fn with_max_magnitude(mut self, magnitude: usize) -> Self {
        self.max_magnitude = if magnitude == 0 { 1 } else { magnitude };
        self
    }

    /// Sets the aggregate.
    #[must_use]
    pub const fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    /// Requested magnitude of the `sample`-th variant.
    #[must_use]
    pub const fn magnitude_for(&self, sample: usize) -> usize {
        let max = if self.max_magnitude == 0 { 1 } else { self.max_magnitude };
        1 + sample % max
    }
}

/// A perturbed tree and the number of edits that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Perturbed {
    /// The edited tree.
    pub tree: TextTree,
    /// Edits actually applied; at most the requested magnitude.
    pub applied: usize,
}

/// Generated records plus the samples that could not be produced.
#[derive(Debug, Clone, Default)]
pub struct PerturbationCorpus {
    /// Generated records, ordered by class, then reference, then sample.
    pub records: Vec<PerturbationRecord>,
    /// Requested samples skipped because no edit applied, per class.
    pub skipped: BTreeMap<PerturbationClass, usize>,
}

impl PerturbationCorpus {
    /// Records of one class.
    pub fn of_class(&self, class: PerturbationClass) -> impl Iterator<Item = &PerturbationRecord> {
        self.records.iter().filter(move |r| r.class == class)
    }

    /// Total skipped samples.
    #[must_use]
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Generates perturbed variants of reference trees.
///
/// Uses a seeded RNG for deterministic, reproducible output: the same seed,
/// content source and references always give the same variants.
///
/// # Examples
///
/// ```
/// use text_tree::{Outline, TextTree};
/// use text_tree_eval::{LexiconContent, PerturbationClass, PerturbationGenerator};
///
/// let reference = TextTree::from_outline(&Outline::new(
///     "Paper",
///     vec![Outline::leaf("Introduction"), Outline::leaf("Results")],
/// )).unwrap();
///
/// let mut generator = PerturbationGenerator::new(42, LexiconContent::academic());
/// let variant = generator
///     .perturb(&reference, PerturbationClass::Paraphrase, 2)
///     .unwrap();
/// assert_eq!(variant.applied, 2);
/// assert_eq!(variant.tree.len(), reference.len());
/// ```
pub struct PerturbationGenerator<S> {
    rng: ChaCha8Rng,
    content: S,
}

impl<S: ContentSource> PerturbationGenerator<S> {
    /// Creates a new generator with the given seed.
    #[must_use]
    pub fn new(seed: u64, content: S) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            content,
        }
    }

    /// Returns the content source.
    #[must_use]
    pub const fn content(&self) -> &S {
        &self.content
    }

    /// Applies up to `magnitude` (at least 1) edits of `class` to `reference`.
    ///
    /// Content edits touch distinct nodes; structural edits are chosen among
    /// moving a subtree, splicing out a node and duplicating a leaf.
    ///
    /// # Errors
    ///
    /// - `PerturbationError::EmptyReference` for the empty tree
    /// - `PerturbationError::NoApplicableEdit` if not a single edit applied
    pub fn perturb(
        &mut self,
        reference: &TextTree,
        class: PerturbationClass,
        magnitude: usize,
    ) -> Result<Perturbed, PerturbationError> {
        let mut draft = Draft::from_tree(reference).ok_or(PerturbationError::EmptyReference)?;
        let wanted = magnitude.max(1);
        let applied = match class {
            PerturbationClass::Structural => (0..wanted)
                .filter(|_| draft.apply_structural(&mut self.rng))
                .count(),
            PerturbationClass::Paraphrase | PerturbationClass::Semantic => {
                self.rewrite_texts(&mut draft, class, wanted)
            }
        };
        if applied == 0 {
            return Err(PerturbationError::NoApplicableEdit { class });
        }
        Ok(Perturbed {
            tree: draft.into_tree()?,
            applied,
        })
    }

    /// Generates `samples_per_class` variants per reference and class.
    ///
    /// Samples that cannot be produced are skipped, logged and counted.
    pub fn generate_corpus(
        &mut self,
        references: &[TextTree],
        config: &PerturbationConfig,
    ) -> PerturbationCorpus {
        let mut corpus = PerturbationCorpus::default();
        for class in PerturbationClass::ALL {
            for (reference_index, reference) in references.iter().enumerate() {
                for sample in 0..config.samples_per_class {
                    let magnitude = config.magnitude_for(sample);
                    match self.perturb(reference, class, magnitude) {
                        Ok(variant) => corpus.records.push(PerturbationRecord {
                            reference: reference.clone(),
                            perturbed: variant.tree,
                            class,
                            magnitude: variant.applied,
                            reference_index,
                        }),
                        Err(e) => {
                            tracing::warn!(
                                %class,
                                reference_index,
                                magnitude,
                                error = %e,
                                "skipping perturbation sample"
                            );
                            *corpus.skipped.entry(class).or_insert(0) += 1;
                        }
                    }
                }
            }
        }
        tracing::debug!(
            records = corpus.records.len(),
            skipped = corpus.skipped_total(),
            "generated perturbation corpus"
        );
        corpus
    }

    fn rewrite_texts(&mut self, draft: &mut Draft, class: PerturbationClass, wanted: usize) -> usize {
        let mut nodes = draft.live();
        nodes.shuffle(&mut self.rng);
        let mut applied = 0;
        for node in nodes {
            if applied == wanted {
                break;
            }
            let original = &draft.texts[node];
            let replacement = match class {
                PerturbationClass::Paraphrase => self.content.paraphrase(original, &mut self.rng),
                _ => self.content.semantic_replacement(original, &mut self.rng),
            };
            if let Some(text) = replacement.filter(|t| !t.trim().is_empty() && t != original) {
                draft.texts[node] = text;
                applied += 1;
            }
        }
        applied
    }
}

/// Mutable arena a reference is copied into while it is edited.
///
/// Nodes removed by a splice stay in the arena but become unreachable from
/// the root; [`Draft::into_tree`] drops them.
struct Draft {
    root: usize,
    texts: Vec<String>,
    children: Vec<Vec<usize>>,
    parent: Vec<Option<usize>>,
}

#[derive(Debug, Clone, Copy)]
enum StructuralEdit {
    Move,
    Splice,
    DuplicateLeaf,
}

impl Draft {
    fn from_tree(tree: &TextTree) -> Option<Self> {
        let root = tree.root()?.index();
        let mut draft = Self {
            root,
            texts: Vec::with_capacity(tree.len()),
            children: Vec::with_capacity(tree.len()),
            parent: Vec::with_capacity(tree.len()),
        };
        for id in tree.node_ids() {
            draft.texts.push(tree.text(id).to_string());
            draft
                .children
                .push(tree.children(id).iter().map(|c| c.index()).collect());
            draft.parent.push(tree.parent(id).map(|p| p.index()));
        }
        Some(draft)
    }

    /// Reachable nodes in preorder.
    fn live(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.texts.len());
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children[node].iter().rev());
        }
        order
    }

    /// Whether `ancestor` is `node` or lies on its path to the root.
    fn is_ancestor(&self, ancestor: usize, node: usize) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent[n];
        }
        false
    }

    fn apply_structural(&mut self, rng: &mut ChaCha8Rng) -> bool {
        let mut edits = [
            StructuralEdit::Move,
            StructuralEdit::Splice,
            StructuralEdit::DuplicateLeaf,
        ];
        edits.shuffle(rng);
        edits.into_iter().any(|edit| match edit {
            StructuralEdit::Move => self.move_subtree(rng),
            StructuralEdit::Splice => self.splice_node(rng),
            StructuralEdit::DuplicateLeaf => self.duplicate_leaf(rng),
        })
    }

    fn non_root(&self) -> Vec<usize> {
        self.live().into_iter().filter(|&n| n != self.root).collect()
    }

    /// Moves a non-root subtree under a parent outside it.
    fn move_subtree(&mut self, rng: &mut ChaCha8Rng) -> bool {
        let live = self.live();
        let mut candidates = self.non_root();
        candidates.shuffle(rng);
        for node in candidates {
            let Some(old_parent) = self.parent[node] else {
                continue;
            };
            let targets: Vec<usize> = live
                .iter()
                .copied()
                .filter(|&t| t != old_parent && !self.is_ancestor(node, t))
                .collect();
            let Some(&target) = targets.choose(rng) else {
                continue;
            };
            self.children[old_parent].retain(|&c| c != node);
            let position = rng.gen_range(0..=self.children[target].len());
            self.children[target].insert(position, node);
            self.parent[node] = Some(target);
            return true;
        }
        false
    }

    /// Removes a non-root node, putting its children in its place.
    fn splice_node(&mut self, rng: &mut ChaCha8Rng) -> bool {
        let Some(&node) = self.non_root().choose(rng) else {
            return false;
        };
        let Some(parent) = self.parent[node] else {
            return false;
        };
        let Some(position) = self.children[parent].iter().position(|&c| c == node) else {
            return false;
        };
        let orphans = std::mem::take(&mut self.children[node]);
        for &child in &orphans {
            self.parent[child] = Some(parent);
        }
        self.children[parent].splice(position..=position, orphans);
        self.parent[node] = None;
        true
    }

    /// Adds a copy of an existing leaf's text as a new leaf anywhere.
    fn duplicate_leaf(&mut self, rng: &mut ChaCha8Rng) -> bool {
        let live = self.live();
        let leaves: Vec<usize> = live
            .iter()
            .copied()
            .filter(|&n| self.children[n].is_empty())
            .collect();
        let (Some(&leaf), Some(&target)) = (leaves.choose(rng), live.choose(rng)) else {
            return false;
        };
        let node = self.texts.len();
        self.texts.push(self.texts[leaf].clone());
        self.children.push(Vec::new());
        self.parent.push(Some(target));
        let position = rng.gen_range(0..=self.children[target].len());
        self.children[target].insert(position, node);
        true
    }

    fn into_tree(self) -> Result<TextTree, MalformedTree> {
        let order = self.live();
        let mut remap = vec![0; self.texts.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new;
        }
        let children = order
            .iter()
            .map(|&old| self.children[old].iter().map(|&c| remap[c]).collect())
            .collect();
        let mut texts = self.texts;
        let texts = order
            .iter()
            .map(|&old| std::mem::take(&mut texts[old]))
            .collect();
        TextTree::from_parts(texts, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perturbation::LexiconContent;
    use text_tree::Outline;

    fn reference() -> TextTree {
        TextTree::from_outline(&Outline::new(
            "Paper",
            vec![
                Outline::new(
                    "Introduction",
                    vec![Outline::leaf("Motivation"), Outline::leaf("Background")],
                ),
                Outline::new("Methods", vec![Outline::leaf("Dataset")]),
                Outline::leaf("Results"),
            ],
        ))
        .unwrap()
    }

    fn sorted_texts(tree: &TextTree) -> Vec<String> {
        let mut texts: Vec<String> = tree.texts().map(String::from).collect();
        texts.sort();
        texts
    }

    fn shape(tree: &TextTree) -> Vec<usize> {
        tree.preorder()
            .into_iter()
            .map(|id| tree.children(id).len())
            .collect()
    }

    #[test]
    fn paraphrase_keeps_structure() {
        let mut generator = PerturbationGenerator::new(1, LexiconContent::academic());
        let variant = generator
            .perturb(&reference(), PerturbationClass::Paraphrase, 3)
            .unwrap();
        assert_eq!(variant.applied, 3);
        assert_eq!(shape(&variant.tree), shape(&reference()));
        assert_ne!(sorted_texts(&variant.tree), sorted_texts(&reference()));
    }

    #[test]
    fn paraphrase_is_capped_by_rewritable_nodes() {
        let mut generator = PerturbationGenerator::new(1, LexiconContent::academic());
        let tree = TextTree::from_outline(&Outline::new(
            "Appendix",
            vec![Outline::leaf("Results"), Outline::leaf("Acknowledgements")],
        ))
        .unwrap();
        let variant = generator
            .perturb(&tree, PerturbationClass::Paraphrase, 3)
            .unwrap();
        assert_eq!(variant.applied, 1);
    }

    #[test]
    fn semantic_keeps_structure() {
        let mut generator = PerturbationGenerator::new(2, LexiconContent::academic());
        let variant = generator
            .perturb(&reference(), PerturbationClass::Semantic, 2)
            .unwrap();
        assert_eq!(variant.applied, 2);
        assert_eq!(shape(&variant.tree), shape(&reference()));
    }

    #[test]
    fn structural_edits_only_reuse_existing_text() {
        let original = reference();
        let known = sorted_texts(&original);
        for seed in 0..20 {
            let mut generator = PerturbationGenerator::new(seed, LexiconContent::new());
            let variant = generator
                .perturb(&original, PerturbationClass::Structural, 2)
                .unwrap();
            assert_eq!(variant.applied, 2);
            assert_eq!(variant.tree.text(variant.tree.root().unwrap()), "Paper");
            assert!(variant.tree.texts().all(|t| known.iter().any(|k| k == t)));
        }
    }

    #[test]
    fn single_node_structural_duplicates_a_leaf() {
        let mut generator = PerturbationGenerator::new(3, LexiconContent::new());
        let variant = generator
            .perturb(&TextTree::leaf("Solo").unwrap(), PerturbationClass::Structural, 1)
            .unwrap();
        assert_eq!(variant.tree.len(), 2);
        assert!(variant.tree.texts().all(|t| t == "Solo"));
    }

    #[test]
    fn no_content_means_no_edit() {
        let mut generator = PerturbationGenerator::new(4, LexiconContent::new());
        assert_eq!(
            generator.perturb(&reference(), PerturbationClass::Semantic, 1),
            Err(PerturbationError::NoApplicableEdit {
                class: PerturbationClass::Semantic
            })
        );
        assert_eq!(
            generator.perturb(&TextTree::empty(), PerturbationClass::Structural, 1),
            Err(PerturbationError::EmptyReference)
        );
    }

    #[test]
    fn corpus_cycles_magnitudes_per_class() {
        let config = PerturbationConfig::new()
            .with_samples_per_class(4)
            .with_max_magnitude(2);
        let mut generator = PerturbationGenerator::new(5, LexiconContent::academic());
        let corpus = generator.generate_corpus(&[reference()], &config);
        assert_eq!(corpus.records.len(), 12);
        assert_eq!(corpus.skipped_total(), 0);
        for class in PerturbationClass::ALL {
            let magnitudes: Vec<usize> = corpus.of_class(class).map(|r| r.magnitude).collect();
            assert_eq!(magnitudes, vec![1, 2, 1, 2]);
        }
    }

    #[test]
    fn same_seed_same_corpus() {
        let config = PerturbationConfig::default();
        let refs = [reference()];
        let a = PerturbationGenerator::new(9, LexiconContent::academic()).generate_corpus(&refs, &config);
        let b = PerturbationGenerator::new(9, LexiconContent::academic()).generate_corpus(&refs, &config);
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn skipped_samples_are_counted() {
        let config = PerturbationConfig::new().with_samples_per_class(2);
        let mut generator = PerturbationGenerator::new(6, LexiconContent::new());
        let corpus = generator.generate_corpus(&[reference()], &config);
        assert_eq!(corpus.skipped.get(&PerturbationClass::Paraphrase), Some(&2));
        assert_eq!(corpus.skipped.get(&PerturbationClass::Semantic), Some(&2));
        assert_eq!(corpus.of_class(PerturbationClass::Structural).count(), 2);
    }
}
